//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one HTTP client per crawl with browser-like default headers
//! - Picking a random User-Agent from the configured pool per request
//! - Classifying failures as timeout, non-2xx status or transport error
//!
//! There is no retry: every failure is final for that URL.

use crate::config::FetchConfig;
use crate::{MirrorError, Result};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use docmirror::config::FetchConfig;
/// use docmirror::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Picks a User-Agent from the pool at random
pub fn pick_user_agent(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::thread_rng()).map(|s| s.as_str())
}

/// Fetches a page body with a single GET request
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Request or body read timed out | `MirrorError::Timeout` |
/// | Non-2xx response | `MirrorError::Status` |
/// | Anything else | `MirrorError::Http` |
pub async fn fetch_page(client: &Client, url: &Url, user_agents: &[String]) -> Result<String> {
    let mut request = client.get(url.clone());
    if let Some(agent) = pick_user_agent(user_agents) {
        request = request.header(USER_AGENT, agent);
    }

    let response = request
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| classify_error(url, e))?;
    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
    Ok(body)
}

fn classify_error(url: &Url, error: reqwest::Error) -> MirrorError {
    if error.is_timeout() {
        MirrorError::Timeout {
            url: url.to_string(),
        }
    } else {
        MirrorError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
