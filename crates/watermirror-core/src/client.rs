//! HTTP client for the sensor-data endpoint.
//!
//! [`HttpSource`] implements [`ReadingSource`] over plain `GET` requests:
//!
//! - `GET {base}/history` for the live view
//! - `GET {base}/history?page=<n>&limit=<m>` for paginated history
//!
//! # Example
//!
//! ```no_run
//! use watermirror_core::{HttpSource, ReadingSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new("http://192.168.50.172:8001")?;
//!
//! let page = source.fetch_page(1, 10).await?;
//! println!("Fetched {} readings", page.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use watermirror_types::Reading;

use crate::error::{Error, Result};
use crate::traits::ReadingSource;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of [`ReadingSource`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}

impl HttpSource {
    /// Create a source for the given base URL with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The endpoint root (e.g., "http://192.168.50.172:8001")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Create a source with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn history_url(&self) -> String {
        format!("{}/history", self.base_url)
    }

    async fn get(&self, url: &str) -> Result<Vec<Reading>> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(status.as_u16(), url));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e))?;
        let readings: Vec<Reading> = serde_json::from_slice(&body)?;

        debug!(url, count = readings.len(), "Received readings");
        Ok(readings)
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    async fn fetch_latest(&self) -> Result<Vec<Reading>> {
        self.get(&self.history_url()).await
    }

    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Reading>> {
        let url = format!("{}?page={}&limit={}", self.history_url(), page, limit);
        self.get(&url).await
    }

    fn describe(&self) -> String {
        self.history_url()
    }
}
