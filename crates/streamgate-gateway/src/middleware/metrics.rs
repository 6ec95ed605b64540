//! Gateway counters surfaced on the health endpoint.
//!
//! Plain atomics, no histogram machinery. Everything here is monotonic, so
//! relaxed ordering is enough; readers only ever see a slightly stale count.

use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub unauthorized_total: AtomicU64,
    pub quota_rejected: AtomicU64,

    // Catalog counters
    pub videos_published: AtomicU64,

    // Upstream relay counters
    pub playback_tokens_issued: AtomicU64,
    pub upload_links_issued: AtomicU64,
    pub upstream_failures: AtomicU64,

    // Store counters
    pub store_failures: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request hitting any route
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected by the authentication layer
    pub fn record_unauthorized(&self) {
        self.unauthorized_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request refused by the upload quota
    pub fn record_quota_rejection(&self) {
        self.quota_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a video appended to the catalog
    pub fn record_video_published(&self) {
        self.videos_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a playback token minted for a verified caller
    pub fn record_playback_token(&self) {
        self.playback_tokens_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a direct-upload link handed out
    pub fn record_upload_link(&self) {
        self.upload_links_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed call to the video host
    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a catalog store fault
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "unauthorized": self.unauthorized_total.load(Ordering::Relaxed),
                "quota_rejected": self.quota_rejected.load(Ordering::Relaxed),
            },
            "catalog": {
                "videos_published": self.videos_published.load(Ordering::Relaxed),
            },
            "upstream": {
                "playback_tokens": self.playback_tokens_issued.load(Ordering::Relaxed),
                "upload_links": self.upload_links_issued.load(Ordering::Relaxed),
                "failures": self.upstream_failures.load(Ordering::Relaxed),
            },
            "store": {
                "failures": self.store_failures.load(Ordering::Relaxed),
            },
        })
    }
}
