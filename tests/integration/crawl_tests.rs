//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end: fetch, render, persist, map and rewrite.

use docmirror::config::Config;
use docmirror::crawler::{inspect_page, Coordinator};
use docmirror::output::rewrite_all;
use docmirror::state::PageState;
use docmirror::MirrorError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.delay_secs = 0.0;
    config.fetch.timeout_secs = 5;
    config
}

/// Mounts an HTML page at `route`, expecting it to be fetched `times` times
async fn mount_page(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn read(dir: &Path, file: &str) -> String {
    std::fs::read_to_string(dir.join(file))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", file, e))
}

fn md_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".md"))
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_three_page_site_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><head><title>Root</title></head><body>
            <h1>Root</h1>
            <p>Read <a href="/org/repo/a">Page A</a> and <a href="/org/repo/b">Page B</a>.</p>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/org/repo/a",
        r#"<html><head><title>A</title></head><body>
            <p>Back to <a href="/org/repo">Home</a>.</p>
            <p>Also <a href="/elsewhere/c">Page C</a>.</p>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/org/repo/b",
        r#"<html><head><title>B</title></head><body><p>Leaf page</p></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/elsewhere/c", "<p>C</p>", 0).await;

    let coordinator = Coordinator::new(
        &create_test_config(2),
        &format!("{}/org/repo", base),
        out.path(),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    // Exactly three documents
    assert_eq!(
        md_files(out.path()),
        vec!["org-repo-a.md", "org-repo-b.md", "org-repo.md"]
    );

    // Mapping file with three entries
    let mapping: serde_json::Value =
        serde_json::from_str(&read(out.path(), "url_mapping.json")).unwrap();
    let entries = mapping.as_object().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[&format!("{}/org/repo/a", base)], "org-repo-a.md");
    assert_eq!(report.mapping.len(), 3);

    // Root links point at the local files
    let root = read(out.path(), "org-repo.md");
    assert!(root.contains("(org-repo-a.md)"), "root was: {}", root);
    assert!(root.contains("(org-repo-b.md)"), "root was: {}", root);
    assert!(!root.contains("(/org/repo/a)"));

    // Link back to the root is rewritten; out-of-scope link stays raw
    let a = read(out.path(), "org-repo-a.md");
    assert!(a.contains("(org-repo.md)"), "a was: {}", a);
    assert!(a.contains("(/elsewhere/c)"), "a was: {}", a);

    assert_eq!(report.statistics.pages_saved(), 3);
    assert_eq!(report.statistics.mapping_entries, 3);
    assert!(report.rewrite.links_rewritten >= 3);
}

#[tokio::test]
async fn test_documents_have_metadata_header() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_page(&server, "/docs", "<html><body><p>Hello</p></body></html>", 1).await;

    let start = format!("{}/docs", server.uri());
    Coordinator::new(&create_test_config(1), &start, out.path())
        .unwrap()
        .run()
        .await
        .unwrap();

    let doc = read(out.path(), "docs.md");
    assert!(doc.starts_with(&format!("---\nsource: {}\ncrawled_at: ", start)));
    let body_start = doc.find("---\n\n").unwrap();
    assert!(doc[body_start..].contains("Hello"));
}

#[tokio::test]
async fn test_depth_bound_stops_expansion() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><body><a href="/org/repo/one">One</a></body></html>"#,
        1,
    )
    .await;
    // Depth 1: rendered, but its links are not followed
    mount_page(
        &server,
        "/org/repo/one",
        r#"<html><body><a href="/org/repo/two">Two</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/org/repo/two", "<p>Too deep</p>", 0).await;

    let report = Coordinator::new(
        &create_test_config(1),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    assert_eq!(md_files(out.path()), vec!["org-repo-one.md", "org-repo.md"]);
    assert_eq!(
        report.state_of(&format!("{}/org/repo/two", server.uri())),
        None
    );

    // Unvisited target stays a raw link
    let one = read(out.path(), "org-repo-one.md");
    assert!(one.contains("(/org/repo/two)"), "one was: {}", one);
}

#[tokio::test]
async fn test_depth_zero_renders_only_start_page() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><body><a href="/org/repo/one">One</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/org/repo/one", "<p>One</p>", 0).await;

    Coordinator::new(
        &create_test_config(0),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    assert_eq!(md_files(out.path()), vec!["org-repo.md"]);
}

#[tokio::test]
async fn test_fetch_failure_is_not_fatal() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><body>
            <a href="/org/repo/missing">Missing</a>
            <a href="/org/repo/broken">Broken</a>
            <a href="/org/repo/ok">Ok</a>
        </body></html>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/org/repo/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/org/repo/ok", "<p>Fine</p>", 1).await;

    let report = Coordinator::new(
        &create_test_config(2),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    let missing = format!("{}/org/repo/missing", server.uri());
    assert_eq!(report.state_of(&missing), Some(PageState::FetchFailed));
    assert!(!report.mapping.contains(&missing));
    assert_eq!(report.statistics.fetch_failures(), 2);
    assert_eq!(report.statistics.pages_saved(), 2);

    assert_eq!(md_files(out.path()), vec!["org-repo-ok.md", "org-repo.md"]);
    let root = read(out.path(), "org-repo.md");
    assert!(root.contains("(/org/repo/missing)"));
    assert!(root.contains("(org-repo-ok.md)"));
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Every page links to every other page, with and without fragments
    let nav = r##"<html><body>
        <a href="/org/repo">Home</a>
        <a href="/org/repo/a">A</a>
        <a href="/org/repo/a#usage">A usage</a>
        <a href="/org/repo/b">B</a>
        <a href="b">B relative</a>
        <a href="/org/repo/c">C</a>
    </body></html>"##;
    for route in ["/org/repo", "/org/repo/a", "/org/repo/b", "/org/repo/c"] {
        mount_page(&server, route, nav, 1).await;
    }

    let mut config = create_test_config(5);
    config.crawler.concurrency = 4;

    let report = Coordinator::new(&config, &format!("{}/org/repo", server.uri()), out.path())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.statistics.pages_discovered, 4);
    assert_eq!(report.statistics.pages_saved(), 4);
    assert_eq!(report.mapping.len(), 4);

    let root = read(out.path(), "org-repo.md");
    assert!(root.contains("(org-repo-a.md#usage)"), "root was: {}", root);
}

#[tokio::test]
async fn test_diagrams_rendered_in_place() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><body>
            <h1>Architecture</h1>
            <div class="mermaid">graph TD;A-->B;</div>
            <p>Closing words</p>
        </body></html>"#,
        1,
    )
    .await;

    let report = Coordinator::new(
        &create_test_config(1),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    let doc = read(out.path(), "org-repo.md");
    let fence = doc
        .find("```mermaid\nflowchart TD;A-->B;\n```")
        .unwrap_or_else(|| panic!("no fence in: {}", doc));
    assert!(fence < doc.find("Closing words").unwrap());
    assert!(!doc.contains("DOCMIRRORDIAGRAM"));
    assert_eq!(report.statistics.diagrams_rendered, 1);
}

#[tokio::test]
async fn test_rewrite_pass_is_idempotent() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo",
        r#"<html><body><a href="/org/repo/a">A</a></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/org/repo/a",
        r#"<html><body><a href="/org/repo">Home</a></body></html>"#,
        1,
    )
    .await;

    let coordinator = Coordinator::new(
        &create_test_config(2),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap();
    let scope = coordinator.scope().clone();
    let report = coordinator.run().await.unwrap();

    let before_root = read(out.path(), "org-repo.md");
    let before_a = read(out.path(), "org-repo-a.md");

    let second = rewrite_all(out.path(), &report.mapping, &scope).await;
    assert_eq!(second.links_rewritten, 0);
    assert_eq!(second.documents_rewritten, 0);
    assert_eq!(read(out.path(), "org-repo.md"), before_root);
    assert_eq!(read(out.path(), "org-repo-a.md"), before_a);
}

#[tokio::test]
async fn test_output_dir_failure_is_fatal() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("taken");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = Coordinator::new(
        &create_test_config(1),
        &format!("{}/org/repo", server.uri()),
        blocker.join("out"),
    )
    .unwrap()
    .run()
    .await;

    assert!(matches!(result, Err(MirrorError::OutputDir { .. })));
}

#[tokio::test]
async fn test_custom_mapping_file_name() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_page(&server, "/org/repo", "<p>Root</p>", 1).await;

    let mut config = create_test_config(1);
    config.output.mapping_file = "links.json".to_string();

    let report = Coordinator::new(&config, &format!("{}/org/repo", server.uri()), out.path())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.mapping_path, Some(out.path().join("links.json")));
    assert!(out.path().join("links.json").is_file());
    assert!(!out.path().join("url_mapping.json").exists());
}

#[tokio::test]
async fn test_mapping_write_failure_is_reported() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_page(
        &server,
        "/org/repo",
        r#"<html><body><a href="/org/repo/a">A</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/org/repo/a", "<p>A</p>", 1).await;

    // A directory where the mapping file should go
    std::fs::create_dir(out.path().join("url_mapping.json")).unwrap();

    let report = Coordinator::new(
        &create_test_config(1),
        &format!("{}/org/repo", server.uri()),
        out.path(),
    )
    .unwrap()
    .run()
    .await
    .unwrap();

    assert_eq!(report.mapping_path, None);
    assert_eq!(report.mapping.len(), 2);
    assert!(read(out.path(), "org-repo.md").contains("(org-repo-a.md)"));
}

#[tokio::test]
async fn test_relative_links_rewritten_against_their_page() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/org/repo/",
        r#"<html><body><a href="guide">Guide</a></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/org/repo/guide",
        r#"<html><body><a href="./">Up</a></body></html>"#,
        1,
    )
    .await;

    let start = format!("{}/org/repo/", server.uri());
    let coordinator = Coordinator::new(&create_test_config(2), &start, out.path()).unwrap();
    let scope = coordinator.scope().clone();
    let report = coordinator.run().await.unwrap();

    let guide = format!("{}/org/repo/guide", server.uri());
    let guide_file = report.mapping.get(&guide).unwrap().to_string();
    let root_file = report.mapping.get(&start).unwrap().to_string();

    let root = read(out.path(), &root_file);
    assert!(root.contains(&format!("[Guide]({})", guide_file)), "root was: {}", root);
    let guide_doc = read(out.path(), &guide_file);
    assert!(guide_doc.contains(&format!("[Up]({})", root_file)), "guide was: {}", guide_doc);

    let second = rewrite_all(out.path(), &report.mapping, &scope).await;
    assert_eq!(second.links_rewritten, 0);
}

#[tokio::test]
async fn test_inspect_page_skips_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/org/repo",
        r#"<html><body><pre class="mermaid">graph LR;X-->Y</pre><a href="/org/repo/a">A</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/org/repo/a", "<p>A</p>", 0).await;

    let inspection = inspect_page(&create_test_config(2), &format!("{}/org/repo", server.uri()))
        .await
        .unwrap();

    assert_eq!(inspection.fragments.len(), 2);
    assert!(inspection
        .fences
        .iter()
        .all(|f| f.as_deref() == Some("```mermaid\nflowchart LR;X-->Y\n```")));
    assert_eq!(inspection.diagrams_rendered, 1);
    assert!(inspection.markdown.contains("```mermaid"));
}
