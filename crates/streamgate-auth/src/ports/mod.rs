//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: `Authenticate`, the credential check the gateway
//!   middleware dispatches into
//! - **Outbound (Driven)**: `KeySource`, where identity-provider signing keys
//!   come from

pub mod inbound;
pub mod outbound;
