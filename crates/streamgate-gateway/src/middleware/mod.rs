//! HTTP middleware: wallet authentication, CORS, and request counters.
//!
//! The authentication layer wraps only the protected routes; CORS wraps the
//! whole router so preflights and rejections carry the same headers.

pub mod auth;
pub mod cors;
pub mod metrics;

pub use auth::{unauthorized_response, AuthLayer, AuthenticatedWallet};
pub use cors::create_cors_layer;
pub use metrics::GatewayMetrics;
