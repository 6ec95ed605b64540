//! Domain layer: configuration and error types.
//!
//! Pure data and validation, no I/O. Everything the adapters and the
//! service agree on lives here.

pub mod config;
pub mod error;

pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
