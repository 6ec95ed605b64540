//! # Authentication Errors
//!
//! Error taxonomy shared by all verifiers. Every variant is collapsed into
//! the same uniform `Unauthenticated` outcome at the dispatcher boundary,
//! so none of this detail ever reaches a caller.

use thiserror::Error;

/// Errors that can occur while verifying credentials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Structurally invalid token or signature input
    #[error("Malformed credential: {0}")]
    Malformed(String),

    /// No signing key in the provider's set matches the token's key id
    #[error("No signing key matches kid {0:?}")]
    KeyNotFound(String),

    /// A cryptographic check failed
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// The token's embedded nonce does not match the caller-supplied one
    #[error("Nonce does not match")]
    NonceMismatch,

    /// The signing-key fetch failed or returned unusable data
    #[error("Key source unavailable: {0}")]
    KeySourceUnavailable(String),

    /// The identity token is expired (only with the expiry policy enabled)
    #[error("Identity token expired")]
    Expired,

    /// The recovered address does not match the claimed wallet
    #[error("Recovered address does not match claimed wallet")]
    WalletMismatch,

    /// Neither credential scheme's headers are present
    #[error("No credentials presented")]
    CredentialsMissing,
}
