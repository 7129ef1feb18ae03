//! Deferred link rewriting
//!
//! Runs once the crawl has drained: every persisted document is re-read and
//! each Markdown link whose target resolves, against the document's source
//! URL, to an in-scope URL present in the mapping is pointed at the mapped
//! file instead. Rewritten targets are local `.md` names that never appear
//! as mapping keys, so running the pass again changes nothing.

use crate::output::document::{read_document, write_document};
use crate::output::mapping::UrlMapping;
use crate::url::UrlScope;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use url::Url;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

/// Totals for one rewrite pass over the output directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Documents whose contents changed
    pub documents_rewritten: usize,

    /// Links pointed at local files
    pub links_rewritten: usize,

    /// Documents that could not be read or written back
    pub failures: usize,
}

/// Rewrites the in-scope links of one Markdown document
///
/// Relative targets are resolved against `page_url`, the URL the document
/// was rendered from. Returns the new text and the number of links
/// rewritten. A `#fragment` on the original target is kept on the rewritten
/// one. Links to URLs that are out of scope or were never rendered are left
/// untouched.
pub fn rewrite_links(
    markdown: &str,
    page_url: &Url,
    mapping: &UrlMapping,
    scope: &UrlScope,
) -> (String, usize) {
    let mut rewritten = 0;

    let text = MARKDOWN_LINK.replace_all(markdown, |caps: &Captures| {
        let label = &caps[1];
        let target = caps[2].trim();

        match mapped_target(target, page_url, mapping, scope) {
            Some(local) => {
                rewritten += 1;
                format!("[{}]({})", label, local)
            }
            None => caps[0].to_string(),
        }
    });

    (text.into_owned(), rewritten)
}

fn mapped_target(
    target: &str,
    page_url: &Url,
    mapping: &UrlMapping,
    scope: &UrlScope,
) -> Option<String> {
    let (address, fragment) = match target.find('#') {
        Some(i) => target.split_at(i),
        None => (target, ""),
    };

    let url = scope.resolve_link(address, page_url)?;
    let file = mapping.get(url.as_str())?;
    tracing::trace!("Rewriting link {} -> {}", target, file);
    Some(format!("{}{}", file, fragment))
}

/// Rewrites every document listed in the mapping
///
/// Documents that are missing (their write failed during the crawl) or
/// cannot be rewritten are logged and counted; the pass continues.
pub async fn rewrite_all(output_dir: &Path, mapping: &UrlMapping, scope: &UrlScope) -> RewriteSummary {
    let mut summary = RewriteSummary::default();

    for (url, file_name) in mapping.iter() {
        let path = output_dir.join(file_name);

        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                tracing::warn!("Skipping link rewrite for {}: bad source URL {}: {}", file_name, url, e);
                summary.failures += 1;
                continue;
            }
        };

        let contents = match read_document(&path).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Skipping link rewrite for {} ({}): {}", file_name, url, e);
                summary.failures += 1;
                continue;
            }
        };

        let (updated, count) = rewrite_links(&contents, &page_url, mapping, scope);
        if count == 0 {
            continue;
        }

        match write_document(&path, &updated).await {
            Ok(()) => {
                tracing::debug!("Rewrote {} links in {}", count, file_name);
                summary.documents_rewritten += 1;
                summary.links_rewritten += count;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                summary.failures += 1;
            }
        }
    }

    tracing::info!(
        "Link rewrite finished: {} links in {} documents",
        summary.links_rewritten,
        summary.documents_rewritten
    );
    summary
}
