//! Gateway service implementation.
//!
//! Owns the route table, the shared application state, and the server
//! lifecycle. Handlers are thin: credential work already happened in the
//! auth layer, so what remains is catalog bookkeeping against the store
//! port and raw relays to the video host port.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{
    create_cors_layer, unauthorized_response, AuthLayer, AuthenticatedWallet, GatewayMetrics,
};
use crate::ports::outbound::{
    DirectUploadRequest, HostError, StoreError, UpstreamResponse, VideoHost, VideoStore,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use streamgate_auth::{Authenticate, CapabilityVerifier};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Store key holding the published catalog.
const CATALOG_KEY: &str = "videos";

/// Store key holding one wallet's upload counter.
fn counter_key(wallet: &str) -> String {
    format!("users:{wallet}:videos")
}

/// The gateway HTTP service
pub struct GatewayService {
    config: Arc<GatewayConfig>,
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(
        config: GatewayConfig,
        authenticator: Arc<dyn Authenticate>,
        store: Arc<dyn VideoStore>,
        host: Arc<dyn VideoHost>,
    ) -> Result<Self, GatewayError> {
        // Validate configuration
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        // Parse the capability network key once, up front
        let capability = CapabilityVerifier::from_hex(
            config.capability.network_pubkey.trim_start_matches("0x"),
        )
        .map_err(|e| GatewayError::Config(format!("network public key: {e}")))?;

        let config = Arc::new(config);
        let state = AppState {
            config: Arc::clone(&config),
            authenticator,
            capability: Arc::new(capability),
            store,
            host,
            metrics: Arc::new(GatewayMetrics::new()),
        };

        Ok(Self {
            config,
            state,
            shutdown_tx: None,
        })
    }

    /// Start the gateway server
    pub async fn start(&mut self) -> Result<(), GatewayError> {
        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let addr = self.config.http_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        info!(addr = %addr, "Starting HTTP server");

        let server = tokio::spawn(async move { axum::serve(listener, router).await });

        // Wait for shutdown signal or server error
        tokio::select! {
            _ = shutdown_rx => {
                info!("Received shutdown signal");
            }
            result = server => {
                match result {
                    Ok(Err(e)) => error!(error = %e, "HTTP server error"),
                    Err(e) => error!(error = %e, "HTTP server task failed"),
                    Ok(Ok(())) => {}
                }
            }
        }

        info!("Gateway stopped");
        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    /// Build the route tree.
    ///
    /// Only the exact method-path pairs below exist; a known path with the
    /// wrong method falls through to the same 404 as an unknown path, so
    /// the route table leaks nothing. The auth layer wraps individual
    /// method routers, never the fallbacks.
    pub fn router(&self) -> Router {
        let state = self.state.clone();
        let auth = AuthLayer::new(
            Arc::clone(&state.authenticator),
            Arc::clone(&state.metrics),
        );

        Router::new()
            .route(
                "/kv/videos",
                get(list_videos)
                    .merge(post(append_video).layer(auth.clone()))
                    .fallback(not_found),
            )
            .route(
                "/videos/presigned-url",
                get(presigned_url).layer(auth.clone()).fallback(not_found),
            )
            .route(
                "/videos/:id",
                get(video_details).layer(auth.clone()).fallback(not_found),
            )
            .route(
                "/upload/link",
                get(upload_link).layer(auth).fallback(not_found),
            )
            .route("/health", get(health_check).fallback(not_found))
            .fallback(not_found)
            .layer(create_cors_layer(&self.config.cors))
            .with_state(state)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<GatewayConfig>,
    authenticator: Arc<dyn Authenticate>,
    capability: Arc<CapabilityVerifier>,
    store: Arc<dyn VideoStore>,
    host: Arc<dyn VideoHost>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    fn store_error(&self, err: StoreError) -> GatewayError {
        self.metrics.record_store_failure();
        GatewayError::Store(err.to_string())
    }

    fn upstream_error(&self, err: HostError) -> GatewayError {
        self.metrics.record_upstream_failure();
        GatewayError::Upstream(err.to_string())
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// GET /kv/videos - public catalog listing
async fn list_videos(State(state): State<AppState>) -> Result<Response, GatewayError> {
    state.metrics.record_request();
    let videos = read_catalog(&state).await?;
    Ok(Json(serde_json::json!({ "data": videos })).into_response())
}

/// POST /kv/videos - append one entry to the catalog
async fn append_video(
    State(state): State<AppState>,
    Extension(wallet): Extension<AuthenticatedWallet>,
    body: String,
) -> Result<Response, GatewayError> {
    state.metrics.record_request();
    let count = check_quota(&state, &wallet.0).await?;

    let mut entry: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&body)
        .map_err(|e| GatewayError::BadRequest(format!("body is not a JSON object: {e}")))?;
    // The wallet is stamped from the verified credential; whatever the
    // body claimed is overwritten.
    entry.insert(
        "wallet".to_string(),
        serde_json::Value::String(wallet.0.clone()),
    );

    let mut videos = read_catalog(&state).await?;
    videos.push(serde_json::Value::Object(entry));
    let serialized = serde_json::to_string(&videos)
        .map_err(|e| GatewayError::Store(format!("catalog serialization: {e}")))?;
    state
        .store
        .put(CATALOG_KEY, serialized)
        .await
        .map_err(|e| state.store_error(e))?;

    state
        .store
        .put(&counter_key(&wallet.0), (count + 1).to_string())
        .await
        .map_err(|e| state.store_error(e))?;

    state.metrics.record_video_published();
    debug!(wallet = %wallet.0, "video published");
    Ok("ok".into_response())
}

/// GET /videos/presigned-url - mint a playback token for capability holders
async fn presigned_url(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    state.metrics.record_request();

    let Some(token) = headers.get("x-lit-jwt").and_then(|v| v.to_str().ok()) else {
        state.metrics.record_unauthorized();
        return Ok(unauthorized_response());
    };

    // Capability failures look identical to missing credentials: bare 401.
    let payload = match state.capability.verify(token) {
        Ok(payload) => payload,
        Err(reason) => {
            debug!(%reason, "capability token rejected");
            state.metrics.record_unauthorized();
            return Ok(unauthorized_response());
        }
    };
    let video_id = match payload.video_id() {
        Ok(id) => id,
        Err(reason) => {
            debug!(%reason, "capability payload rejected");
            state.metrics.record_unauthorized();
            return Ok(unauthorized_response());
        }
    };

    let expires_at =
        Utc::now().timestamp() + state.config.capability.playback_ttl.as_secs() as i64;
    let upstream = state
        .host
        .playback_token(&video_id, expires_at)
        .await
        .map_err(|e| state.upstream_error(e))?;

    state.metrics.record_playback_token();
    Ok(relay(upstream))
}

/// GET /videos/:id - relay provider metadata for one video
async fn video_details(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Response, GatewayError> {
    state.metrics.record_request();
    let upstream = state
        .host
        .video_details(&video_id)
        .await
        .map_err(|e| state.upstream_error(e))?;
    Ok(relay(upstream))
}

/// GET /upload/link - open a direct-upload slot for the wallet
async fn upload_link(
    State(state): State<AppState>,
    Extension(wallet): Extension<AuthenticatedWallet>,
) -> Result<Response, GatewayError> {
    state.metrics.record_request();
    check_quota(&state, &wallet.0).await?;

    let request = direct_upload_request(&state.config);
    let upstream = state
        .host
        .direct_upload(&request)
        .await
        .map_err(|e| state.upstream_error(e))?;

    state.metrics.record_upload_link();
    Ok(relay(upstream))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.record_request();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "streamgate",
        "version": env!("CARGO_PKG_VERSION"),
        "counters": state.metrics.to_json(),
    }))
}

/// Fallback for everything outside the route table
async fn not_found(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.record_request();
    (StatusCode::NOT_FOUND, "404, not found!")
}

// =============================================================================
// HELPERS
// =============================================================================

/// Read the published catalog, treating an absent key as empty.
async fn read_catalog(state: &AppState) -> Result<Vec<serde_json::Value>, GatewayError> {
    let raw = state
        .store
        .get(CATALOG_KEY)
        .await
        .map_err(|e| state.store_error(e))?;

    match raw {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            state.metrics.record_store_failure();
            GatewayError::Store(format!("catalog is not a JSON array: {e}"))
        }),
    }
}

/// Read a wallet's upload counter. Absent or unreadable values count as
/// zero rather than locking the wallet out.
async fn read_video_count(state: &AppState, wallet: &str) -> Result<u64, GatewayError> {
    let raw = state
        .store
        .get(&counter_key(wallet))
        .await
        .map_err(|e| state.store_error(e))?;
    Ok(raw
        .and_then(|text| text.trim().parse::<u64>().ok())
        .unwrap_or(0))
}

/// Refuse the request once the wallet's counter is past the limit.
///
/// Returns the current count so the append path can bump it without a
/// second read.
async fn check_quota(state: &AppState, wallet: &str) -> Result<u64, GatewayError> {
    let count = read_video_count(state, wallet).await?;
    if count > state.config.quota.max_videos {
        debug!(%wallet, count, "upload quota reached");
        state.metrics.record_quota_rejection();
        return Err(GatewayError::BadRequest(
            "You have reached your upload limit.".to_string(),
        ));
    }
    Ok(count)
}

/// Build the provider request for one upload slot.
fn direct_upload_request(config: &GatewayConfig) -> DirectUploadRequest {
    let expires = Utc::now() + chrono::Duration::seconds(config.upload.window.as_secs() as i64);
    DirectUploadRequest {
        max_duration_seconds: config.upload.max_duration_seconds,
        expiry: expires.to_rfc3339_opts(SecondsFormat::Millis, true),
        require_signed_urls: true,
        allowed_origins: vec![strip_scheme(&config.cors.allowed_origin)],
        thumbnail_timestamp_pct: config.upload.thumbnail_timestamp_pct,
    }
}

/// Origins in upload slots carry no scheme.
fn strip_scheme(origin: &str) -> String {
    origin
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .to_string()
}

/// Hand a provider reply to the caller byte-for-byte.
fn relay(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    response
}

// =============================================================================
// TESTS
// =============================================================================
