use crate::client::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::error::{Result, ScanError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// An audited page as it came back from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub requested_url: String,
    /// URL after following redirects
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Compared in parsed form, so `https://host` and `https://host/` are
    /// the same page.
    pub fn was_redirected(&self) -> bool {
        match Url::parse(&self.requested_url) {
            Ok(requested) => requested.as_str() != self.final_url,
            Err(_) => self.final_url != self.requested_url,
        }
    }
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET a page and keep its body whatever the status code.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching page {}", url);
        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status_code,
            content_type,
            body,
        })
    }
}
