//! Streamgate gateway binary.
//!
//! Boots the HTTP edge with configuration from `STREAMGATE_*` environment
//! variables and runs until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use streamgate_auth::{Authenticator, HttpKeySource, IdentityPolicy};
use streamgate_gateway::adapters::{MemoryStore, StreamHostClient};
use streamgate_gateway::domain::config::{parse_duration, GatewayConfig};
use streamgate_gateway::GatewayService;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Load configuration from the environment.
///
/// Every variable is optional; unreadable values are logged and skipped so
/// a typo degrades to the default instead of a refused boot.
fn load_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();

    if let Ok(host) = std::env::var("STREAMGATE_HOST") {
        match host.parse() {
            Ok(h) => config.http.host = h,
            Err(_) => warn!("STREAMGATE_HOST is not a valid IP address"),
        }
    }
    if let Ok(port) = std::env::var("STREAMGATE_PORT") {
        match port.parse() {
            Ok(p) => config.http.port = p,
            Err(_) => warn!("STREAMGATE_PORT is not a valid port"),
        }
    }
    if let Ok(origin) = std::env::var("STREAMGATE_ALLOWED_ORIGIN") {
        config.cors.allowed_origin = origin;
    }
    if let Ok(url) = std::env::var("STREAMGATE_JWKS_URL") {
        config.identity.jwks_url = url;
    }
    if let Ok(ttl) = std::env::var("STREAMGATE_KEY_CACHE_TTL") {
        match parse_duration(&ttl) {
            Ok(d) => config.identity.key_cache_ttl = d,
            Err(e) => warn!("STREAMGATE_KEY_CACHE_TTL: {e}"),
        }
    }
    if let Ok(flag) = std::env::var("STREAMGATE_REJECT_EXPIRED") {
        config.identity.reject_expired = matches!(flag.as_str(), "1" | "true");
    }
    if let Ok(key) = std::env::var("STREAMGATE_NETWORK_PUBKEY") {
        config.capability.network_pubkey = key;
    }
    if let Ok(max) = std::env::var("STREAMGATE_MAX_VIDEOS") {
        match max.parse() {
            Ok(m) => config.quota.max_videos = m,
            Err(_) => warn!("STREAMGATE_MAX_VIDEOS is not a number"),
        }
    }
    if let Ok(base) = std::env::var("STREAMGATE_VIDEO_API_BASE") {
        config.video_host.api_base = base;
    }
    if let Ok(account) = std::env::var("STREAMGATE_ACCOUNT_ID") {
        config.video_host.account_id = account;
    }
    if let Ok(token) = std::env::var("STREAMGATE_API_TOKEN") {
        config.video_host.api_token = token;
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = load_config();

    // One HTTP client serves both outbound concerns
    let client = reqwest::Client::new();

    let key_source = HttpKeySource::with_ttl(
        client.clone(),
        config.identity.jwks_url.clone(),
        config.identity.key_cache_ttl,
    );
    let authenticator = Arc::new(Authenticator::with_policy(
        key_source,
        IdentityPolicy {
            reject_expired: config.identity.reject_expired,
        },
    ));

    let store = Arc::new(MemoryStore::new());
    let host = Arc::new(StreamHostClient::new(client, &config.video_host));

    let mut service = GatewayService::new(config, authenticator, store, host)
        .context("failed to build gateway")?;

    info!("Gateway is running. Press Ctrl+C to stop.");
    tokio::select! {
        result = service.start() => result.context("gateway server failed")?,
        _ = tokio::signal::ctrl_c() => info!("Ctrl+C received, shutting down"),
    }

    // Graceful shutdown
    service.shutdown();

    Ok(())
}
