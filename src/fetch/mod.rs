// src/fetch/mod.rs
pub mod html;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use url::Url;

/// Fetch `url_str` and return the response body as text.
/// Network and HTTP-status failures propagate to the caller; there is no
/// retry and no timeout beyond the client defaults.
pub fn page_text(url_str: &str) -> Result<String> {
    let url = Url::parse(url_str).with_context(|| format!("invalid URL {}", url_str))?;

    let client = Client::new();
    let resp = client
        .get(url.as_str())
        .send()
        .with_context(|| format!("fetching {}", url_str))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url_str))?;

    resp.text()
        .with_context(|| format!("reading response body from {}", url_str))
}
