//! URL handling module for docmirror
//!
//! This module decides which URLs belong to a crawl, resolves relative
//! references, and maps URLs onto the file names documents are saved under.

mod domain;
mod filename;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, origin_key, same_authority};
pub use filename::{derive_output_dir, is_aggregator_host, to_file_path, DEFAULT_OUTPUT_DIR};
pub use matcher::matches_wildcard;
pub use normalize::{ensure_slashes, normalize_url, scope_prefix_for, strip_query_and_fragment};

use crate::UrlError;
use url::Url;

/// Schemes that never point at a crawlable document
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// The subtree of a site that a crawl is restricted to
///
/// A scope is a base URL (whose authority every in-scope URL must share) and
/// a path prefix that always starts and ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlScope {
    base: Url,
    prefix: String,
}

impl UrlScope {
    /// Creates a scope rooted at the start URL's own directory
    ///
    /// # Examples
    ///
    /// ```
    /// use docmirror::url::UrlScope;
    ///
    /// let scope = UrlScope::new("https://deepwiki.com/qemu/qemu").unwrap();
    /// assert_eq!(scope.prefix(), "/qemu/qemu/");
    /// assert!(scope.is_in_scope("/qemu/qemu/1-overview"));
    /// assert!(!scope.is_in_scope("/rust-lang/rust"));
    /// ```
    pub fn new(start_url: &str) -> Result<Self, UrlError> {
        let base = parse_base(start_url)?;
        let prefix = scope_prefix_for(&base);
        Ok(Self { base, prefix })
    }

    /// The base URL of the crawl
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The path prefix, with leading and trailing `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Checks whether a URL reference belongs to this scope
    ///
    /// See [`is_in_scope`] for the rules.
    pub fn is_in_scope(&self, url_str: &str) -> bool {
        is_in_scope(url_str, &self.base, &self.prefix)
    }

    /// Resolves a URL reference against the crawl base URL
    pub fn normalize(&self, url_str: &str) -> Result<Url, UrlError> {
        normalize_url(url_str, &self.base)
    }

    /// Resolves a link found on `page_url` into a crawlable in-scope URL
    ///
    /// Returns `None` when the link must not be followed:
    /// - empty and fragment-only hrefs
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - references outside the scope, including protocol-relative links to
    ///   other hosts
    /// - references that cannot be resolved
    ///
    /// The fragment of the resolved URL is removed so that anchors on the
    /// same page deduplicate to one URL.
    pub fn resolve_link(&self, href: &str, page_url: &Url) -> Option<Url> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let lower = href.to_lowercase();
        if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return None;
        }

        let mut resolved = if href.starts_with("//") {
            // Protocol-relative: scope-check against its own authority.
            let absolute = Url::parse(&format!("{}:{}", self.base.scheme(), href)).ok()?;
            if !self.is_in_scope(absolute.as_str()) {
                return None;
            }
            absolute
        } else if href.starts_with('/') || Url::parse(href).is_ok() {
            if !self.is_in_scope(href) {
                return None;
            }
            self.normalize(href).ok()?
        } else {
            let absolute = page_url.join(href).ok()?;
            if !self.is_in_scope(absolute.as_str()) {
                return None;
            }
            absolute
        };

        resolved.set_fragment(None);
        Some(resolved)
    }
}

/// Checks whether a URL reference belongs to a crawl scope
///
/// # Rules
///
/// - Absolute URLs are in scope iff their authority matches `base` and their
///   path starts with `prefix`
/// - Root-relative references (`/...`) are in scope iff their path starts
///   with `prefix`; the authority is assumed to match
/// - Protocol-relative references (`//host/...`) are treated as absolute
///   URLs on `base`'s scheme, never as root-relative paths
/// - The scope root itself (`prefix` without its trailing `/`) is in scope
/// - Relative paths and unparseable references are out of scope
///
/// This is a pure function and never fails.
///
/// # Examples
///
/// ```
/// use docmirror::url::is_in_scope;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/org/repo").unwrap();
/// assert!(is_in_scope("/org/repo/x", &base, "/org/repo/"));
/// assert!(!is_in_scope("//evil.com/org/repo", &base, "/org/repo/"));
/// ```
pub fn is_in_scope(url_str: &str, base: &Url, prefix: &str) -> bool {
    let url_str = url_str.trim();

    if url_str.starts_with("//") {
        return match Url::parse(&format!("{}:{}", base.scheme(), url_str)) {
            Ok(url) => same_authority(&url, base) && path_in_scope(url.path(), prefix),
            Err(_) => false,
        };
    }

    if url_str.starts_with('/') {
        return path_in_scope(strip_query_and_fragment(url_str), prefix);
    }

    match Url::parse(url_str) {
        Ok(url) => same_authority(&url, base) && path_in_scope(url.path(), prefix),
        Err(_) => false,
    }
}

fn path_in_scope(path: &str, prefix: &str) -> bool {
    if path.starts_with(prefix) {
        return true;
    }
    let root = prefix.trim_end_matches('/');
    !root.is_empty() && path == root
}

fn parse_base(start_url: &str) -> Result<Url, UrlError> {
    let base = Url::parse(start_url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(UrlError::InvalidScheme(base.scheme().to_string()));
    }

    if base.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> UrlScope {
        UrlScope::new("https://example.com/org/repo").unwrap()
    }

    #[test]
    fn test_scope_prefix_derived_from_start_url() {
        assert_eq!(scope().prefix(), "/org/repo/");
    }

    #[test]
    fn test_root_relative_in_scope() {
        assert!(scope().is_in_scope("/org/repo/x"));
        assert!(scope().is_in_scope("/org/repo/x/y?z=1"));
        assert!(!scope().is_in_scope("/org/other/x"));
        assert!(!scope().is_in_scope("/org/repository"));
    }

    #[test]
    fn test_scope_root_itself_in_scope() {
        assert!(scope().is_in_scope("/org/repo"));
        assert!(scope().is_in_scope("https://example.com/org/repo"));
        assert!(scope().is_in_scope("/org/repo#top"));
    }

    #[test]
    fn test_protocol_relative_is_not_root_relative() {
        assert!(!scope().is_in_scope("//evil.com/org/repo"));
        assert!(!scope().is_in_scope("//evil.com/org/repo/x"));
        assert!(scope().is_in_scope("//example.com/org/repo/x"));
    }

    #[test]
    fn test_absolute_urls() {
        assert!(scope().is_in_scope("https://example.com/org/repo/x"));
        assert!(scope().is_in_scope("https://EXAMPLE.com/org/repo/x"));
        assert!(!scope().is_in_scope("https://other.com/org/repo/x"));
        assert!(!scope().is_in_scope("https://example.com:8443/org/repo/x"));
        assert!(!scope().is_in_scope("https://example.com/elsewhere"));
    }

    #[test]
    fn test_relative_and_malformed_out_of_scope() {
        assert!(!scope().is_in_scope("x"));
        assert!(!scope().is_in_scope("org/repo/x"));
        assert!(!scope().is_in_scope("http://[not-a-host/org/repo/x"));
        assert!(!scope().is_in_scope(""));
        assert!(!scope().is_in_scope("org-repo-x.md"));
    }

    #[test]
    fn test_scope_check_is_pure() {
        let s = scope();
        for _ in 0..3 {
            assert!(s.is_in_scope("/org/repo/x"));
            assert!(!s.is_in_scope("//evil.com/org/repo"));
        }
    }

    #[test]
    fn test_new_rejects_bad_start_urls() {
        assert!(matches!(UrlScope::new("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(
            UrlScope::new("ftp://example.com/a"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let page = Url::parse("https://example.com/org/repo/a").unwrap();
        let resolved = scope().resolve_link("/org/repo/b#part", &page).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/org/repo/b");
    }

    #[test]
    fn test_resolve_relative_link() {
        let page = Url::parse("https://example.com/org/repo/a").unwrap();
        let resolved = scope().resolve_link("c", &page).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/org/repo/c");

        assert!(scope().resolve_link("../../elsewhere", &page).is_none());
    }

    #[test]
    fn test_resolve_skips_special_links() {
        let page = Url::parse("https://example.com/org/repo/a").unwrap();
        for href in [
            "",
            "   ",
            "#section",
            "javascript:void(0)",
            "mailto:a@example.com",
            "tel:+123",
            "data:text/html,hi",
            "https://other.com/org/repo/x",
            "//evil.com/org/repo/x",
        ] {
            assert!(scope().resolve_link(href, &page).is_none(), "href: {}", href);
        }
    }

    #[test]
    fn test_resolve_protocol_relative_same_host() {
        let page = Url::parse("https://example.com/org/repo/a").unwrap();
        let resolved = scope()
            .resolve_link("//example.com/org/repo/z", &page)
            .unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/org/repo/z");
    }
}
