//! # Streamgate Gateway
//!
//! HTTP edge for the wallet-gated video service: the public catalog, video
//! publishing, direct-upload links, playback tokens, and metadata relays.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    STREAMGATE GATEWAY                      │
//! │                                                            │
//! │   HTTP routes                                              │
//! │   ├─ GET  /kv/videos              public catalog           │
//! │   ├─ POST /kv/videos              publish (auth + quota)   │
//! │   ├─ GET  /videos/presigned-url   playback (capability)    │
//! │   ├─ GET  /videos/:id             metadata relay (auth)    │
//! │   ├─ GET  /upload/link            upload slot (auth+quota) │
//! │   └─ GET  /health                 liveness + counters      │
//! │                                                            │
//! │   AuthLayer ──▶ streamgate-auth (wallet + identity)        │
//! │                                                            │
//! │   VideoStore port          VideoHost port                  │
//! │   (catalog, counters)      (tokens, metadata, uploads)     │
//! │        │                        │                          │
//! │   MemoryStore              StreamHostClient                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use streamgate_gateway::{GatewayConfig, GatewayService};
//!
//! let config = GatewayConfig::default();
//! let mut service = GatewayService::new(config, authenticator, store, host)?;
//! service.start().await?;
//! ```
//!
//! # Security
//!
//! - Both credential schemes and the capability check live in
//!   `streamgate-auth`; this crate only decides which routes demand them.
//! - Rejections are uniform: bare 401 for credentials, the shared 404 for
//!   anything off the route table.
//! - The published wallet on a catalog entry always comes from the verified
//!   credential, never from the request body.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::error::GatewayError;
pub use middleware::GatewayMetrics;
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
