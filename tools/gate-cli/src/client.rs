//! Thin HTTP client for the gateway's route table.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::wallet::SignedHeaders;

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connection(String),
}

/// One gateway reply, body untouched.
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

/// Gateway HTTP client.
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client against one gateway base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(3))
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Plain GET, no credentials.
    pub async fn get(&self, path: &str) -> Result<Reply, ApiError> {
        self.send(self.client.get(self.url(path))).await
    }

    /// GET carrying a wallet-signature credential.
    pub async fn get_signed(
        &self,
        path: &str,
        headers: &SignedHeaders,
    ) -> Result<Reply, ApiError> {
        self.send(headers.apply(self.client.get(self.url(path)))).await
    }

    /// GET carrying a capability token.
    pub async fn get_with_capability(&self, path: &str, token: &str) -> Result<Reply, ApiError> {
        self.send(self.client.get(self.url(path)).header("x-lit-jwt", token))
            .await
    }

    /// POST a raw body under a wallet-signature credential.
    pub async fn post_signed(
        &self,
        path: &str,
        headers: &SignedHeaders,
        body: String,
    ) -> Result<Reply, ApiError> {
        self.send(headers.apply(self.client.post(self.url(path))).body(body))
            .await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Reply, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(format!("cannot connect to {}", self.base_url))
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::Http)?;
        Ok(Reply { status, body })
    }
}
