//! Diagram position markers
//!
//! A marker is a plain alphanumeric token inserted into the DOM as a text
//! node. It survives HTML-to-Markdown conversion unchanged, so the converted
//! text can be searched for it afterwards.

use scraper::node::Text;
use scraper::{Html, Node};
use sha2::{Digest, Sha256};

/// Fixed prefix of every marker token
pub const MARKER_PREFIX: &str = "DOCMIRRORDIAGRAM";

/// Number of hex digits of the content hash kept in a marker
const KEY_LEN: usize = 16;

/// Returns the marker token for a diagram's raw content
///
/// Identical content yields identical markers.
///
/// # Examples
///
/// ```
/// use docmirror::render::marker_for;
///
/// let marker = marker_for("graph TD;A-->B;");
/// assert!(marker.starts_with("DOCMIRRORDIAGRAM"));
/// assert_eq!(marker, marker_for("graph TD;A-->B;"));
/// ```
pub fn marker_for(raw_content: &str) -> String {
    let digest = Sha256::digest(raw_content.as_bytes());
    let key = hex::encode(digest);
    format!("{}{}", MARKER_PREFIX, &key[..KEY_LEN])
}

/// Elements the converter turns into code blocks
const CODE_ELEMENTS: [&str; 2] = ["pre", "code"];

/// Inserts `marker` after the parent element of every text node containing
/// `needle`
///
/// When the parent sits inside `pre` or `code` the marker goes after the
/// outermost such element instead, so the fence never lands inside a code
/// block. Returns the number of markers inserted. Text nodes directly under
/// the document root have no element to anchor to and are skipped.
pub fn insert_marker(document: &mut Html, needle: &str, marker: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    let mut anchors = Vec::new();
    for node in document.tree.root().descendants() {
        let matches = node
            .value()
            .as_text()
            .map(|text| text.contains(needle))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let Some(parent) = node.parent() else {
            continue;
        };
        if !parent.value().is_element() || parent.parent().is_none() {
            continue;
        }

        let id = std::iter::successors(Some(parent), |n| n.parent())
            .filter(|n| {
                n.value()
                    .as_element()
                    .map(|e| CODE_ELEMENTS.contains(&e.name()))
                    .unwrap_or(false)
            })
            .last()
            .unwrap_or(parent)
            .id();
        if !anchors.contains(&id) {
            anchors.push(id);
        }
    }

    let mut inserted = 0;
    for id in anchors {
        if let Some(mut anchor) = document.tree.get_mut(id) {
            anchor.insert_after(Node::Text(Text {
                text: marker.into(),
            }));
            inserted += 1;
        }
    }

    inserted
}
