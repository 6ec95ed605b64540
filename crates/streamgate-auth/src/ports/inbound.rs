//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{AuthOutcome, AuthRequest, IdentityClaim};
use crate::domain::errors::AuthError;

/// Primary credential verification API.
///
/// This is the entry point the HTTP edge drives. Implementations must be
/// thread-safe (`Send + Sync`) so one instance can sit behind the whole
/// listener.
#[async_trait::async_trait]
pub trait Authenticate: Send + Sync {
    /// Run the scheme dispatcher against one request's credentials.
    ///
    /// Scheme selection is by header presence, in fixed priority; see the
    /// service implementation for the exact rules. Failures come back as
    /// [`AuthOutcome::Unauthenticated`] with the internal reason attached,
    /// never as an error the transport could leak.
    async fn authenticate(&self, request: &AuthRequest) -> AuthOutcome;

    /// Verify one identity token against the current provider key set and
    /// the caller's nonce challenge.
    ///
    /// # Errors
    /// * `AuthError::KeySourceUnavailable` - provider keys could not be fetched
    /// * `AuthError::KeyNotFound` - no key matches the token's kid after a fresh fetch
    /// * `AuthError::Malformed` - token or key material is not decodable
    /// * `AuthError::SignatureInvalid` - signature check failed
    /// * `AuthError::NonceMismatch` - token nonce differs from `nonce`
    async fn verify_identity_token(
        &self,
        token: &str,
        nonce: &str,
    ) -> Result<IdentityClaim, AuthError>;

    /// Verify a personal-message signature and check the recovered signer
    /// against the claimed wallet, case-insensitively.
    ///
    /// Returns the recovered wallet in canonical lowercase `0x`-hex form.
    ///
    /// # Errors
    /// * `AuthError::Malformed` - signature hex is not decodable or wrong length
    /// * `AuthError::SignatureInvalid` - recovery failed
    /// * `AuthError::WalletMismatch` - recovered signer is a different wallet
    fn verify_wallet_signature(
        &self,
        message: &str,
        signature: &str,
        claimed_wallet: &str,
    ) -> Result<String, AuthError>;
}
