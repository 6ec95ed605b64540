//! # Domain Entities
//!
//! Core data structures for credential verification. Everything here is
//! request-scoped: created during a single verification, immutable after
//! creation, never persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::AuthError;

/// Ethereum-style address derived from a public key (last 20 bytes of keccak256(pubkey))
pub type Address = [u8; 20];

// =============================================================================
// ECDSA Types (secp256k1)
// =============================================================================

/// ECDSA signature on the secp256k1 curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

// =============================================================================
// Provider Key Types
// =============================================================================

/// One signing key published by the identity provider.
///
/// The provider currently publishes RSA keys only; entries of other types
/// are carried through the document and simply never verify anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderKey {
    /// Key identifier, matched against the token header's `kid`.
    #[serde(default)]
    pub kid: String,
    /// Key type (`RSA` for every key the provider currently serves).
    pub kty: String,
    /// Signing algorithm hint, when published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus, base64url.
    #[serde(default)]
    pub n: String,
    /// RSA public exponent, base64url.
    #[serde(default)]
    pub e: String,
}

/// Wire shape of the provider's published key document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeysDocument {
    /// The provider's current keys.
    pub keys: Vec<ProviderKey>,
}

/// Key-id-indexed set of provider keys, built once per fetch.
#[derive(Clone, Debug, Default)]
pub struct KeySet {
    keys: HashMap<String, ProviderKey>,
}

impl KeySet {
    /// Index a fetched key list by key id. On duplicate ids the last entry
    /// wins, mirroring how providers publish rotations.
    pub fn from_keys(keys: Vec<ProviderKey>) -> Self {
        let keys = keys.into_iter().map(|k| (k.kid.clone(), k)).collect();
        Self { keys }
    }

    /// Look up a key by exact identifier match.
    pub fn find(&self, kid: &str) -> Option<&ProviderKey> {
        self.keys.get(kid)
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<KeysDocument> for KeySet {
    fn from(document: KeysDocument) -> Self {
        Self::from_keys(document.keys)
    }
}

/// Whether a key set came straight from the provider or out of the
/// adapter's cache. The verifier uses this to decide if a key-id miss
/// deserves one forced refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFreshness {
    /// Fetched from the provider for this very call.
    Fetched,
    /// Served from a still-valid cache entry.
    Cached,
}

// =============================================================================
// Identity Claim Types
// =============================================================================

/// Claim set decoded from an identity token.
///
/// Unknown provider claims are ignored on decode; the fields here are the
/// ones the gateway acts on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Wallet address asserted by the identity provider.
    pub wallet_address: String,
    /// Nonce bound into the token at issuance time.
    pub nonce: String,
    /// Expiry as unix seconds, when the provider includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Token issuer, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Token subject, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// A verified identity claim plus the raw token it was decoded from.
///
/// Constructed only by the identity verifier after the signature check
/// passed. The raw token is retained for downstream forwarding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityClaim {
    /// The decoded claim set.
    pub claims: IdentityClaims,
    /// Original compact token.
    pub raw: String,
}

impl IdentityClaim {
    /// Wallet address asserted by the provider, as issued (not normalized).
    pub fn wallet_address(&self) -> &str {
        &self.claims.wallet_address
    }

    /// Nonce embedded at issuance time.
    pub fn nonce(&self) -> &str {
        &self.claims.nonce
    }
}

// =============================================================================
// Capability Token Types
// =============================================================================

/// Payload of a verified delegated-authorization token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPayload {
    /// Expiry as unix seconds.
    pub exp: i64,
    /// Issuance time as unix seconds, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Token issuer, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Token subject, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// JSON-encoded resource reference, e.g. `{"videoId": "..."}`.
    #[serde(default, rename = "extraData", skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<String>,
}

/// Resource reference embedded in a capability payload's `extraData`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ResourceRef {
    #[serde(rename = "videoId")]
    video_id: String,
}

impl CapabilityPayload {
    /// Parse the nested `extraData` JSON and return the video id it names.
    ///
    /// A payload without `extraData`, or with `extraData` that is not the
    /// expected JSON shape, fails `Malformed`.
    pub fn video_id(&self) -> Result<String, AuthError> {
        let raw = self
            .extra_data
            .as_deref()
            .ok_or_else(|| AuthError::Malformed("capability payload has no extraData".into()))?;
        let reference: ResourceRef = serde_json::from_str(raw)
            .map_err(|e| AuthError::Malformed(format!("capability extraData: {e}")))?;
        Ok(reference.video_id)
    }
}

// =============================================================================
// Dispatcher Types
// =============================================================================

/// Credential material extracted from one inbound request.
///
/// All fields are optional; which ones are present decides the scheme.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthRequest {
    /// `x-auth-jwt`: compact identity token.
    pub id_token: Option<String>,
    /// `x-auth-nonce`: caller-supplied nonce.
    pub nonce: Option<String>,
    /// `x-auth-message`: UTF-8 plaintext that was signed.
    pub message: Option<String>,
    /// `x-auth-signature`: 65-byte recoverable signature, hex.
    pub signature: Option<String>,
    /// `x-auth-wallet`: claimed address, case-insensitive.
    pub wallet: Option<String>,
}

/// Outcome of running the dispatcher against one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The caller proved control of `wallet` (lowercase `0x`-hex).
    Authenticated {
        /// Resolved wallet identifier.
        wallet: String,
    },
    /// No scheme succeeded. The reason stays internal; HTTP callers get a
    /// bare 401.
    Unauthenticated {
        /// Why the request was rejected. Logged, never sent to the caller.
        reason: AuthError,
    },
}

impl AuthOutcome {
    /// Whether the request authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
