use crate::url::matcher::matches_wildcard;
use crate::url::normalize::strip_query_and_fragment;
use std::path::PathBuf;
use url::Url;

/// Characters that are unsafe in file names on at least one platform
const UNSAFE_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Hosts whose documents are mirrored under `wiki_info/<slug>` by default
const AGGREGATOR_HOSTS: &[&str] = &["*.deepwiki.com"];

/// Default output directory for every other host
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Maps a URL to the relative Markdown file name it is saved under
///
/// The authority, query and fragment are dropped; the remaining path has its
/// surrounding slashes trimmed, every filesystem-unsafe character replaced by
/// `-`, and `.md` appended. An empty path maps to `index.md`.
///
/// This function is total: relative and unparseable inputs are handled as
/// raw paths, so every input yields a file name ending in `.md`.
///
/// # Examples
///
/// ```
/// use docmirror::url::to_file_path;
///
/// assert_eq!(to_file_path("https://deepwiki.com/qemu/qemu/2.1-build"), "qemu-qemu-2.1-build.md");
/// assert_eq!(to_file_path("https://deepwiki.com/"), "index.md");
/// ```
pub fn to_file_path(url_str: &str) -> String {
    let path = match Url::parse(url_str) {
        Ok(url) => url.path().to_string(),
        Err(_) => strip_query_and_fragment(url_str).to_string(),
    };

    let trimmed = path.trim_matches('/');
    let stem = if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.replace(UNSAFE_FILENAME_CHARS, "-")
    };

    format!("{}.md", stem)
}

/// Returns true if the host is a known documentation aggregator
pub fn is_aggregator_host(host: &str) -> bool {
    let host = host.to_lowercase();
    AGGREGATOR_HOSTS
        .iter()
        .any(|pattern| matches_wildcard(pattern, &host))
}

/// Derives the default output directory for a crawl
///
/// Aggregator-hosted documentation goes to `wiki_info/<slug>` where the slug
/// is the URL path with its slashes replaced by `_`; everything else goes to
/// `output`.
///
/// # Examples
///
/// ```
/// use docmirror::url::derive_output_dir;
/// use std::path::PathBuf;
/// use url::Url;
///
/// let url = Url::parse("https://deepwiki.com/qemu/qemu").unwrap();
/// assert_eq!(derive_output_dir(&url), PathBuf::from("wiki_info/qemu_qemu"));
/// ```
pub fn derive_output_dir(start_url: &Url) -> PathBuf {
    match start_url.host_str() {
        Some(host) if is_aggregator_host(host) => {
            let trimmed = start_url.path().trim_matches('/');
            let slug = if trimmed.is_empty() {
                "index".to_string()
            } else {
                trimmed.replace('/', "_")
            };
            PathBuf::from("wiki_info").join(slug)
        }
        _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_path() {
        assert_eq!(to_file_path("https://example.com/org/repo/a"), "org-repo-a.md");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(to_file_path("https://example.com/org/repo/"), "org-repo.md");
    }

    #[test]
    fn test_empty_path_is_index() {
        assert_eq!(to_file_path("https://example.com"), "index.md");
        assert_eq!(to_file_path("https://example.com/"), "index.md");
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            to_file_path("https://example.com/org/a?tab=1#section"),
            "org-a.md"
        );
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        assert_eq!(
            to_file_path("https://example.com/a:b/c*d/e|f"),
            "a-b-c-d-e-f.md"
        );
    }

    #[test]
    fn test_relative_input_is_total() {
        assert_eq!(to_file_path("/org/repo/x?y=1"), "org-repo-x.md");
        assert_eq!(to_file_path(""), "index.md");
        assert_eq!(to_file_path("not a url"), "not a url.md");
    }

    #[test]
    fn test_always_ends_with_md() {
        for input in [
            "https://example.com/",
            "https://example.com/a/b/c",
            "http://127.0.0.1:9000/x.html",
            "mailto:someone@example.com",
            "data:text/plain,hello",
            "???",
        ] {
            assert!(to_file_path(input).ends_with(".md"), "input: {}", input);
        }
    }

    #[test]
    fn test_aggregator_host() {
        assert!(is_aggregator_host("deepwiki.com"));
        assert!(is_aggregator_host("www.DeepWiki.com"));
        assert!(!is_aggregator_host("example.com"));
    }

    #[test]
    fn test_derive_output_dir_for_aggregator() {
        let url = Url::parse("https://deepwiki.com/qemu/qemu/").unwrap();
        assert_eq!(derive_output_dir(&url), PathBuf::from("wiki_info/qemu_qemu"));

        let url = Url::parse("https://deepwiki.com/").unwrap();
        assert_eq!(derive_output_dir(&url), PathBuf::from("wiki_info/index"));
    }

    #[test]
    fn test_derive_output_dir_for_other_hosts() {
        let url = Url::parse("https://docs.example.com/guide").unwrap();
        assert_eq!(derive_output_dir(&url), PathBuf::from("output"));
    }
}
