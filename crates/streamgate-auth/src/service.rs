//! # Authentication Service
//!
//! Application service layer that implements the `Authenticate` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`Authenticate`)
//! - Uses the outbound port (`KeySource`) for provider signing keys
//! - Delegates cryptographic operations to domain layer
//!
//! The dispatcher picks exactly one credential scheme per request, by
//! header presence and in fixed priority. Once a scheme is selected its
//! failure is final; a request carrying a broken identity token never
//! falls through to the signature scheme.

use crate::domain::entities::{
    AuthOutcome, AuthRequest, IdentityClaim, KeyFreshness, KeySet, ProviderKey,
};
use crate::domain::errors::AuthError;
use crate::domain::identity::{self, IdentityPolicy};
use crate::domain::wallet;
use crate::ports::inbound::Authenticate;
use crate::ports::outbound::KeySource;

/// Credential verification service.
///
/// Generic over its key source so tests can drive it with a canned set
/// while production wires in the HTTP fetcher.
pub struct Authenticator<S: KeySource> {
    keys: S,
    policy: IdentityPolicy,
}

impl<S: KeySource> Authenticator<S> {
    /// Create a service with the default identity policy (expiry not
    /// enforced).
    pub fn new(keys: S) -> Self {
        Self {
            keys,
            policy: IdentityPolicy::default(),
        }
    }

    /// Create a service with an explicit identity policy.
    pub fn with_policy(keys: S, policy: IdentityPolicy) -> Self {
        Self { keys, policy }
    }

    /// Resolve a token's named key against an already-fetched set,
    /// refetching once when a cached set misses.
    ///
    /// The refetch covers the rotation window: a kid minted after the
    /// cache filled is only declared unknown once a fresh document also
    /// lacks it. A set that was fetched for this very call is already as
    /// fresh as it gets, so a miss there is final.
    async fn resolve_key(
        &self,
        keys: &KeySet,
        freshness: KeyFreshness,
        kid: String,
    ) -> Result<ProviderKey, AuthError> {
        match keys.find(&kid) {
            Some(key) => Ok(key.clone()),
            None => match freshness {
                KeyFreshness::Cached => {
                    tracing::debug!(kid = %kid, "kid missing from cached key set, refetching");
                    let fresh = self.keys.refresh().await?;
                    match fresh.find(&kid) {
                        Some(key) => Ok(key.clone()),
                        None => Err(AuthError::KeyNotFound(kid)),
                    }
                }
                KeyFreshness::Fetched => Err(AuthError::KeyNotFound(kid)),
            },
        }
    }
}

#[async_trait::async_trait]
impl<S: KeySource> Authenticate for Authenticator<S> {
    async fn authenticate(&self, request: &AuthRequest) -> AuthOutcome {
        // Scheme 1: provider-issued identity token. Selected when both the
        // token and the nonce challenge are present.
        if let (Some(token), Some(nonce)) = (&request.id_token, &request.nonce) {
            return match self.verify_identity_token(token, nonce).await {
                Ok(claim) => AuthOutcome::Authenticated {
                    wallet: claim.wallet_address().to_lowercase(),
                },
                Err(reason) => {
                    tracing::debug!(%reason, "identity token rejected");
                    AuthOutcome::Unauthenticated { reason }
                }
            };
        }

        // Scheme 2: direct wallet signature over a plaintext message.
        if let (Some(message), Some(signature), Some(wallet)) =
            (&request.message, &request.signature, &request.wallet)
        {
            return match self.verify_wallet_signature(message, signature, wallet) {
                Ok(wallet) => AuthOutcome::Authenticated { wallet },
                Err(reason) => {
                    tracing::debug!(%reason, "wallet signature rejected");
                    AuthOutcome::Unauthenticated { reason }
                }
            };
        }

        AuthOutcome::Unauthenticated {
            reason: AuthError::CredentialsMissing,
        }
    }

    async fn verify_identity_token(
        &self,
        token: &str,
        nonce: &str,
    ) -> Result<IdentityClaim, AuthError> {
        let (keys, freshness) = self.keys.key_set().await?;

        // A header naming no key can never match a published one, so a
        // missing kid is a lookup miss, not a shape problem.
        let kid = identity::token_key_id(token)?
            .ok_or_else(|| AuthError::KeyNotFound(String::new()))?;
        let key = self.resolve_key(&keys, freshness, kid).await?;

        let claim = identity::verify_with_key(token, &key, self.policy)?;
        identity::check_nonce(&claim, nonce)?;

        Ok(claim)
    }

    fn verify_wallet_signature(
        &self,
        message: &str,
        signature: &str,
        claimed_wallet: &str,
    ) -> Result<String, AuthError> {
        let recovered = wallet::recover_personal_signer(message.as_bytes(), signature)?;

        // Recovery output is canonical lowercase; fold the claim to match.
        if recovered != claimed_wallet.to_lowercase() {
            return Err(AuthError::WalletMismatch);
        }

        Ok(recovered)
    }
}

// =============================================================================
// TESTS
// =============================================================================
