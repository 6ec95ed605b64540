//! # HTTP Key Source Adapter
//!
//! Fetches the identity provider's published key document over HTTPS and
//! implements the `KeySource` port on top of it.
//!
//! ## Caching
//!
//! The adapter holds at most one document. With a zero TTL (the default)
//! every `key_set` call fetches; with a nonzero TTL a still-valid document
//! is served as `Cached` and the service decides whether a kid miss is
//! worth a forced `refresh`. Either way the lock is never held across a
//! network await.
//!
//! ## Security
//!
//! - Transport failures, non-2xx statuses, and undecodable documents all
//!   collapse to `KeySourceUnavailable`; the caller cannot distinguish a
//!   down provider from a corrupted one.
//! - Documents are parsed into typed key entries; unknown JSON fields are
//!   dropped on the floor rather than carried along.

use crate::domain::entities::{KeyFreshness, KeySet, KeysDocument};
use crate::domain::errors::AuthError;
use crate::ports::outbound::KeySource;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One cached key document and when it arrived.
struct CacheEntry {
    keys: KeySet,
    fetched_at: Instant,
}

/// `KeySource` implementation backed by a provider HTTP endpoint.
pub struct HttpKeySource {
    client: reqwest::Client,
    endpoint: String,
    ttl: Duration,
    cache: RwLock<Option<CacheEntry>>,
}

impl HttpKeySource {
    /// Uncached source: every `key_set` call hits the provider.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self::with_ttl(client, endpoint, Duration::ZERO)
    }

    /// Cached source: documents younger than `ttl` are served without a
    /// network round trip.
    pub fn with_ttl(client: reqwest::Client, endpoint: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Fetch and parse the key document.
    async fn fetch(&self) -> Result<KeySet, AuthError> {
        debug!(endpoint = %self.endpoint, "fetching provider key document");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "key document fetch failed");
                AuthError::KeySourceUnavailable(e.to_string())
            })?;

        let document: KeysDocument = response.json().await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "key document not decodable");
            AuthError::KeySourceUnavailable(format!("key document not decodable: {e}"))
        })?;

        Ok(KeySet::from(document))
    }

    /// Cached document, if one exists and is still inside the TTL.
    fn cached(&self) -> Option<KeySet> {
        let cache = self.cache.read();
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.keys.clone())
    }

    fn store(&self, keys: KeySet) {
        *self.cache.write() = Some(CacheEntry {
            keys,
            fetched_at: Instant::now(),
        });
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn key_set(&self) -> Result<(KeySet, KeyFreshness), AuthError> {
        if !self.ttl.is_zero() {
            if let Some(keys) = self.cached() {
                return Ok((keys, KeyFreshness::Cached));
            }
        }

        let keys = self.fetch().await?;
        if !self.ttl.is_zero() {
            self.store(keys.clone());
        }
        Ok((keys, KeyFreshness::Fetched))
    }

    async fn refresh(&self) -> Result<KeySet, AuthError> {
        let keys = self.fetch().await?;
        if !self.ttl.is_zero() {
            self.store(keys.clone());
        }
        Ok(keys)
    }
}

// =============================================================================
// TESTS
// =============================================================================
