//! Source page fetcher.
//!
//! Issues plain GETs against configured source URLs with a browser-like
//! User-Agent to avoid trivial blocking. A failed fetch is reported to the
//! caller as a `FetchError` and never retried here; the pipeline treats it
//! as "zero tournaments from this source".

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

/// Fixed client identity. Source sites commonly reject default
/// library User-Agents outright.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to build page fetcher HTTP client")?;
        Ok(Self { http })
    }

    /// Fetch a source page and return its raw markup.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        debug!(url, bytes = body.len(), "Fetched source page");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
