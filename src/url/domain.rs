use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` or `data:` URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docmirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin key (`host[:port]`) used for per-origin rate limiting
///
/// The port is omitted when it is the scheme's default.
pub fn origin_key(url: &Url) -> String {
    let host = extract_domain(url).unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    }
}

/// Checks whether two URLs share the same authority (host and effective port)
///
/// URLs without a host never match anything, including each other.
pub fn same_authority(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}
