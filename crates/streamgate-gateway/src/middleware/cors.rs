//! CORS layer for the browser player and uploader.
//!
//! Wrapper around tower-http CORS with gateway configuration. The gateway
//! serves exactly one web origin in production, so configuration is a single
//! origin plus the preflight cache lifetime.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer as TowerCorsLayer};

/// Create CORS layer from gateway config
pub fn create_cors_layer(config: &CorsConfig) -> TowerCorsLayer {
    let mut cors = TowerCorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    // Configure origin
    if config.allowed_origin == "*" {
        cors = cors.allow_origin(Any);
    } else if let Ok(origin) = config.allowed_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    cors
}
