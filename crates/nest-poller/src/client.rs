//! Vendor REST client.
//!
//! The devices endpoint answers the first request with a redirect to a
//! shard-specific host and expects clients to keep using that location.
//! The final URL of a successful redirected request is cached and reused
//! until a request against it fails.

use reqwest::Url;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use nest_core::DeviceCollection;

use crate::error::FetchError;

/// Longest slice of an error body carried into a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 512;

pub struct NestClient {
    http: reqwest::Client,
    /// `api_url` with the `auth` query parameter attached.
    endpoint: Url,
    cached_redirect: Mutex<Option<Url>>,
}

impl NestClient {
    /// Create a client for `api_url` authenticating with `token`.
    pub fn new(api_url: &str, token: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nest-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(http, api_url, token)
    }

    /// Create a client on top of an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, api_url: &str, token: &str) -> Result<Self, FetchError> {
        let endpoint = Url::parse_with_params(api_url, &[("auth", token)])
            .map_err(|e| FetchError::Url(format!("{api_url}: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            cached_redirect: Mutex::new(None),
        })
    }

    /// Redirect target remembered from an earlier poll, if any.
    pub async fn cached_redirect(&self) -> Option<Url> {
        self.cached_redirect.lock().await.clone()
    }

    /// Fetch the current device snapshot.
    pub async fn fetch_devices(&self) -> Result<DeviceCollection, FetchError> {
        let cached = self.cached_redirect().await;
        let url = cached.clone().unwrap_or_else(|| self.endpoint.clone());

        let result = self.fetch_from(url).await;
        if result.is_err() && cached.is_some() {
            // Start over from the canonical endpoint next time.
            *self.cached_redirect.lock().await = None;
            warn!("dropping cached redirect after failed request");
        }
        result
    }

    async fn fetch_from(&self, url: Url) -> Result<DeviceCollection, FetchError> {
        let resp = self.http.get(url.clone()).send().await?;
        let final_url = resp.url().clone();
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let text: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let devices = DeviceCollection::from_json(&body)?;

        if final_url != url {
            debug!(
                host = final_url.host_str().unwrap_or_default(),
                "caching redirected devices URL"
            );
            *self.cached_redirect.lock().await = Some(final_url);
        }

        debug!(thermostats = devices.thermostats.len(), "device snapshot fetched");
        Ok(devices)
    }
}
