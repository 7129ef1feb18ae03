//! URL to file mapping
//!
//! Records which file every rendered URL was saved under, in the order the
//! pages were rendered. The mapping is the only source the link rewrite
//! pass consults.

use crate::{MirrorError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::path::Path;

/// Insertion-ordered map from source URL to relative output file name
#[derive(Debug, Clone, Default)]
pub struct UrlMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl UrlMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the file a URL was saved under
    ///
    /// Re-inserting a URL replaces its file name but keeps its position.
    pub fn insert(&mut self, url: impl Into<String>, file_name: impl Into<String>) {
        let url = url.into();
        let file_name = file_name.into();

        match self.index.get(&url) {
            Some(&i) => self.entries[i].1 = file_name,
            None => {
                self.index.insert(url.clone(), self.entries.len());
                self.entries.push((url, file_name));
            }
        }
    }

    /// Looks up the file name for an absolute URL
    pub fn get(&self, url: &str) -> Option<&str> {
        self.index
            .get(url)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(url, file_name)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(url, file)| (url.as_str(), file.as_str()))
    }

    /// Serializes the mapping as a pretty-printed JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the mapping as JSON to `path`
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| MirrorError::Persist {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!("Wrote {} mapping entries to {}", self.len(), path.display());
        Ok(())
    }
}

impl Serialize for UrlMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, file) in &self.entries {
            map.serialize_entry(url, file)?;
        }
        map.end()
    }
}
