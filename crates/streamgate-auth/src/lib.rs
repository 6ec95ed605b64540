//! # Streamgate Authentication Core
//!
//! Credential verification for the gateway: identity-provider tokens,
//! wallet message signatures, and delegated capability tokens.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure verification logic, no I/O
//! - **Ports Layer** (`ports/`): The signing-key source as a trait
//! - **Adapters Layer** (`adapters/`): The HTTPS key source
//! - **Service Layer** (`service.rs`): The dispatcher wiring domain to ports
//!
//! ## Security Notes
//!
//! - A claim, address, or payload is returned only after the cryptographic
//!   check it depends on has passed; extraction never precedes verification.
//! - Failure reasons stay inside the crate boundary; HTTP callers see a
//!   uniform 401 with no detail.
//! - Nonce comparison is constant-time.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::jwks_http::HttpKeySource;
pub use domain::capability::{CapabilityVerifier, DEFAULT_NETWORK_PUBKEY};
pub use domain::entities::{
    Address, AuthOutcome, AuthRequest, CapabilityPayload, EcdsaSignature, IdentityClaim,
    IdentityClaims, KeyFreshness, KeySet, KeysDocument, ProviderKey,
};
pub use domain::errors::AuthError;
pub use domain::identity::IdentityPolicy;
pub use domain::wallet::{hash_personal_message, keccak256, recover_personal_signer};
pub use ports::inbound::Authenticate;
pub use ports::outbound::KeySource;
pub use service::Authenticator;
