//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this subsystem needs.

use axum::http::StatusCode;
use bytes::Bytes;
use serde::Serialize;

/// Errors from the catalog store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed or returned garbage
    #[error("store backend: {0}")]
    Backend(String),
}

/// Errors from the video hosting provider.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The provider could not be reached or the response body was lost
    #[error("transport: {0}")]
    Transport(String),
}

/// Raw reply from the video host, relayed to the caller as-is.
///
/// The gateway deliberately does not reinterpret provider replies: status
/// and body pass through so the player sees exactly what the host said.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status the provider answered with.
    pub status: StatusCode,
    /// Provider response body, untouched.
    pub body: Bytes,
}

/// Parameters for a one-shot direct-upload slot at the video host.
///
/// Field names follow the provider's wire format, which is camelCase with
/// one irregular capitalization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectUploadRequest {
    /// Longest accepted video, in seconds.
    pub max_duration_seconds: u64,
    /// RFC 3339 instant after which the slot is dead.
    pub expiry: String,
    /// Whether playback of the uploaded video needs signed URLs.
    #[serde(rename = "requireSignedURLs")]
    pub require_signed_urls: bool,
    /// Origins allowed to play the result, scheme stripped.
    pub allowed_origins: Vec<String>,
    /// Thumbnail position as a fraction of video duration.
    pub thumbnail_timestamp_pct: f64,
}

/// Key-value store holding the catalog and per-wallet upload counters.
///
/// Values are opaque strings; the service layer owns their JSON shape.
#[async_trait::async_trait]
pub trait VideoStore: Send + Sync {
    /// Read one key.
    ///
    /// # Errors
    /// * `StoreError::Backend` - the store could not serve the read
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write one key, replacing any previous value.
    ///
    /// # Errors
    /// * `StoreError::Backend` - the store could not apply the write
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// The video hosting provider's API surface the gateway drives.
#[async_trait::async_trait]
pub trait VideoHost: Send + Sync {
    /// Mint a signed playback token for one video, valid until `expires_at`
    /// (Unix seconds).
    ///
    /// # Errors
    /// * `HostError::Transport` - the provider could not be reached
    async fn playback_token(
        &self,
        video_id: &str,
        expires_at: i64,
    ) -> Result<UpstreamResponse, HostError>;

    /// Fetch the provider's metadata document for one video.
    ///
    /// # Errors
    /// * `HostError::Transport` - the provider could not be reached
    async fn video_details(&self, video_id: &str) -> Result<UpstreamResponse, HostError>;

    /// Open a one-shot direct-upload slot.
    ///
    /// # Errors
    /// * `HostError::Transport` - the provider could not be reached
    async fn direct_upload(
        &self,
        request: &DirectUploadRequest,
    ) -> Result<UpstreamResponse, HostError>;
}
