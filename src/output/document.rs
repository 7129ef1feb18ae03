//! Persisted Markdown documents
//!
//! A document is written once when its page is rendered and rewritten in
//! place by the link rewrite pass.

use crate::{MirrorError, Result};
use std::path::Path;

/// Creates the output directory and any missing parents
///
/// Failure here is the only error that aborts a crawl.
pub async fn ensure_output_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| MirrorError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })
}

/// Writes a document, replacing any previous contents
pub async fn write_document(path: &Path, contents: &str) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| MirrorError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads a previously written document
pub async fn read_document(path: &Path) -> Result<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}
