/// Checks if a host matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "deepwiki.com" matches only "deepwiki.com"
/// 2. Wildcard match: "*.deepwiki.com" matches:
///    - "deepwiki.com" (the bare domain)
///    - "www.deepwiki.com" (single subdomain)
///    - "a.b.deepwiki.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use docmirror::url::matches_wildcard;
///
/// assert!(matches_wildcard("deepwiki.com", "deepwiki.com"));
/// assert!(matches_wildcard("*.deepwiki.com", "www.deepwiki.com"));
/// assert!(!matches_wildcard("*.deepwiki.com", "deepwiki.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
