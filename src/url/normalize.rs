use crate::UrlError;
use url::Url;

/// Resolves a possibly relative URL against a base URL
///
/// # Resolution Rules
///
/// 1. Already-absolute URLs are returned as parsed, without resolution
/// 2. A leading run of slashes (`//x/y`) is reduced to a single `/` first,
///    so the reference is treated as root-relative rather than
///    protocol-relative
/// 3. Everything else is joined onto `base` using standard URL resolution
///
/// # Examples
///
/// ```
/// use docmirror::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://deepwiki.com/qemu/qemu").unwrap();
/// let url = normalize_url("/qemu/qemu/1-overview", &base).unwrap();
/// assert_eq!(url.as_str(), "https://deepwiki.com/qemu/qemu/1-overview");
///
/// let url = normalize_url("//qemu/qemu/2-build", &base).unwrap();
/// assert_eq!(url.as_str(), "https://deepwiki.com/qemu/qemu/2-build");
/// ```
pub fn normalize_url(url_str: &str, base: &Url) -> Result<Url, UrlError> {
    let url_str = url_str.trim();

    if let Ok(absolute) = Url::parse(url_str) {
        return Ok(absolute);
    }

    let reduced;
    let reference = if url_str.starts_with("//") {
        reduced = format!("/{}", url_str.trim_start_matches('/'));
        reduced.as_str()
    } else {
        url_str
    };

    base.join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))
}

/// Derives the directory scope prefix of a URL
///
/// The prefix is the URL's path with a guaranteed leading and trailing `/`.
///
/// # Examples
///
/// ```
/// use docmirror::url::scope_prefix_for;
/// use url::Url;
///
/// let url = Url::parse("https://deepwiki.com/qemu/qemu").unwrap();
/// assert_eq!(scope_prefix_for(&url), "/qemu/qemu/");
/// ```
pub fn scope_prefix_for(url: &Url) -> String {
    ensure_slashes(url.path())
}

/// Wraps a path in leading and trailing slashes
pub fn ensure_slashes(path: &str) -> String {
    let mut prefix = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        prefix.push('/');
    }
    prefix.push_str(path);
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// Strips the query and fragment from a URL reference
pub fn strip_query_and_fragment(url_str: &str) -> &str {
    let end = url_str.find(|c: char| c == '?' || c == '#').unwrap_or(url_str.len());
    &url_str[..end]
}
