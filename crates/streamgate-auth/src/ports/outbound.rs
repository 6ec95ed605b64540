//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this subsystem needs.

use crate::domain::entities::{KeyFreshness, KeySet};
use crate::domain::errors::AuthError;

/// Source of the identity provider's current signing keys.
///
/// The one driven dependency of the verification core. Implementations may
/// cache; the freshness marker tells the service whether a missed kid
/// lookup still deserves one forced refetch before giving up.
#[async_trait::async_trait]
pub trait KeySource: Send + Sync {
    /// Current key set, together with how fresh it is.
    ///
    /// # Errors
    /// * `AuthError::KeySourceUnavailable` - the provider endpoint could not
    ///   be reached or returned an undecodable document
    async fn key_set(&self) -> Result<(KeySet, KeyFreshness), AuthError>;

    /// Drop any cached state and fetch the key set from the provider now.
    ///
    /// # Errors
    /// * `AuthError::KeySourceUnavailable` - the provider endpoint could not
    ///   be reached or returned an undecodable document
    async fn refresh(&self) -> Result<KeySet, AuthError>;
}
