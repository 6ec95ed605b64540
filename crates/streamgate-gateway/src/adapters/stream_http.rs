//! # Video Host HTTP Adapter
//!
//! Drives the hosting provider's REST API: playback tokens, video metadata,
//! and direct-upload slots. Provider replies come back raw, whatever their
//! status; only transport failures surface as errors, so the service can
//! relay everything else to the caller untouched.

use crate::domain::config::VideoHostConfig;
use crate::ports::outbound::{DirectUploadRequest, HostError, UpstreamResponse, VideoHost};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// `VideoHost` implementation over the provider's account-scoped REST API.
pub struct StreamHostClient {
    client: reqwest::Client,
    api_base: String,
    account_id: String,
    api_token: String,
}

impl StreamHostClient {
    pub fn new(client: reqwest::Client, config: &VideoHostConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
        }
    }

    fn account_url(&self, tail: &str) -> String {
        format!("{}/accounts/{}/{}", self.api_base, self.account_id, tail)
    }

    /// Send one authenticated request and package whatever comes back.
    async fn relay(&self, request: reqwest::RequestBuilder) -> Result<UpstreamResponse, HostError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl VideoHost for StreamHostClient {
    async fn playback_token(
        &self,
        video_id: &str,
        expires_at: i64,
    ) -> Result<UpstreamResponse, HostError> {
        debug!(video_id, expires_at, "requesting playback token");
        let url = self.account_url(&format!("stream/{video_id}/token"));
        self.relay(self.client.post(url).json(&json!({ "exp": expires_at })))
            .await
    }

    async fn video_details(&self, video_id: &str) -> Result<UpstreamResponse, HostError> {
        let url = self.account_url(&format!("stream/{video_id}"));
        self.relay(self.client.get(url)).await
    }

    async fn direct_upload(
        &self,
        request: &DirectUploadRequest,
    ) -> Result<UpstreamResponse, HostError> {
        debug!(expiry = %request.expiry, "opening direct-upload slot");
        let url = self.account_url("stream/direct_upload");
        self.relay(self.client.post(url).json(request)).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
