//! Error types for fetching device snapshots.

use thiserror::Error;

/// Failure to obtain a device snapshot from the vendor API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid API url: {0}")]
    Url(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode device response: {0}")]
    Decode(#[from] serde_json::Error),
}
