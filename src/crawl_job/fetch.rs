//! HTTP fetch with a strict-then-permissive TLS retry.
//!
//! Generalizes `original_source/utils/crawler_job.py::_setup_ssl_contexts`
//! and `_crawl_url`'s dual-`ssl.SSLContext` retry to `reqwest`: a strict
//! client is tried first, and on a TLS-looking failure a second client with
//! `danger_accept_invalid_certs(true)` is retried once. The original also
//! falls back from UTF-8 to Latin-1 decoding on a page with no valid
//! encoding; `reqwest::Response::text()` already performs encoding
//! detection via the response's charset, and this module falls back to a
//! lossy UTF-8 decode of the raw bytes if that fails.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "crawlidx/0.1 (+https://github.com/crawlidx/crawlidx)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

static STRICT_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .expect("strict HTTP client configuration is valid")
});

static PERMISSIVE_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()
        .expect("permissive HTTP client configuration is valid")
});

/// Outcome of fetching a single URL.
pub struct FetchedPage {
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Fetches `url`, retrying once against `PERMISSIVE_CLIENT` if the strict
/// client's request fails with what looks like a TLS error. Non-2xx
/// responses are returned (not treated as an error here) so the caller can
/// log-and-skip per spec.md §7.
pub async fn fetch(url: &str) -> Result<FetchedPage, reqwest::Error> {
    let response = match STRICT_CLIENT.get(url).send().await {
        Ok(response) => response,
        Err(err) if looks_like_tls_error(&err) => PERMISSIVE_CLIENT.get(url).send().await?,
        Err(err) => return Err(err),
    };

    let status = response.status();
    let bytes = response.bytes().await?;
    let body = match String::from_utf8(bytes.to_vec()) {
        Ok(body) => body,
        // Latin-1 (ISO-8859-1) maps every byte 0..=255 onto the codepoint
        // of the same value, so this decode step never itself fails; it
        // mirrors the original's `except UnicodeDecodeError:
        // content.decode('latin-1')` fallback exactly.
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    };

    Ok(FetchedPage { status, body })
}

fn looks_like_tls_error(err: &reqwest::Error) -> bool {
    err.is_connect()
        && err
            .source()
            .map(|source| {
                let text = source.to_string().to_lowercase();
                text.contains("certificate") || text.contains("tls") || text.contains("ssl")
            })
            .unwrap_or(false)
}

use std::error::Error as _;
