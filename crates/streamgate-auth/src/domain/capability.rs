//! # Capability Token Verification (BLS12-381)
//!
//! Verifies delegated-access tokens minted by the external capability
//! network. Tokens arrive in compact JWT layout (`header.payload.signature`)
//! but are signed with BLS rather than any JOSE algorithm, so they are
//! checked here directly against the network's fixed public key instead of
//! going through the JWT stack.
//!
//! ## Security Notes
//!
//! - The signature covers the **exact bytes** `header.payload` as they
//!   appear on the wire. Segments are never re-encoded before hashing, so
//!   an attacker cannot exploit encode/decode asymmetries.
//! - The payload is decoded only **after** the signature verifies. Claims
//!   from an unverified token never reach the caller.
//! - The network public key is a 48-byte compressed G1 point and is group-
//!   checked at construction time. Signatures are 96-byte compressed G2
//!   points, matching the min-pk ciphersuite.

use super::entities::CapabilityPayload;
use super::errors::AuthError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use blst::min_pk::{PublicKey, Signature};
use blst::BLST_ERROR;

/// Hash-to-curve domain separation tag for the min-pk basic scheme.
///
/// Must match the tag the capability network signs under; both sides use
/// the RFC 9380 ciphersuite `BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_`.
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// Compressed G1 public key of the production capability network.
pub const DEFAULT_NETWORK_PUBKEY: &str =
    "9971e835a1fe1a4d78e381eebbe0ddc84fde5119169db816900de796d10187f3c53d65c1202ac083d099a517f34a9b62";

/// Number of dot-separated segments in a compact token.
const TOKEN_SEGMENTS: usize = 3;

// =============================================================================
// VERIFIER
// =============================================================================

/// Checks capability tokens against one fixed network public key.
///
/// The key is parsed and group-checked once at construction; [`verify`]
/// calls are pure CPU work after that.
///
/// [`verify`]: CapabilityVerifier::verify
pub struct CapabilityVerifier {
    network_key: PublicKey,
}

impl CapabilityVerifier {
    /// Build a verifier from a hex-encoded compressed G1 public key.
    pub fn from_hex(encoded: &str) -> Result<Self, AuthError> {
        let bytes = hex::decode(encoded)
            .map_err(|_| AuthError::Malformed("network public key is not valid hex".into()))?;
        Self::from_bytes(&bytes)
    }

    /// Build a verifier from a 48-byte compressed G1 public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AuthError> {
        // key_validate rejects the identity point and anything outside the
        // G1 subgroup, not just undecodable encodings.
        let network_key = PublicKey::key_validate(bytes)
            .map_err(|_| AuthError::Malformed("network public key is not a valid G1 point".into()))?;
        Ok(Self { network_key })
    }

    /// Verify a compact capability token and return its decoded payload.
    ///
    /// Steps, in order:
    /// 1. Split into exactly three dot-separated segments.
    /// 2. Decode the third segment as a BLS signature.
    /// 3. Verify the signature over the raw bytes `header.payload`.
    /// 4. Decode and parse the payload claims.
    pub fn verify(&self, token: &str) -> Result<CapabilityPayload, AuthError> {
        let (header, payload, signature) = split_token(token)?;

        let signature_bytes = decode_segment(signature)?;
        let signature = Signature::from_bytes(&signature_bytes)
            .map_err(|_| AuthError::SignatureInvalid)?;

        let message = format!("{header}.{payload}");
        let outcome = signature.verify(
            true,
            message.as_bytes(),
            BLS_DST,
            &[],
            &self.network_key,
            true,
        );
        if outcome != BLST_ERROR::BLST_SUCCESS {
            return Err(AuthError::SignatureInvalid);
        }

        let payload_bytes = decode_segment(payload)?;
        serde_json::from_slice(&payload_bytes)
            .map_err(|_| AuthError::Malformed("capability payload is not valid JSON".into()))
    }
}

// =============================================================================
// SEGMENT HANDLING
// =============================================================================

/// Split a compact token into its three segments.
fn split_token(token: &str) -> Result<(&str, &str, &str), AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != TOKEN_SEGMENTS {
        return Err(AuthError::Malformed(format!(
            "capability token must have {TOKEN_SEGMENTS} segments, got {}",
            segments.len()
        )));
    }
    Ok((segments[0], segments[1], segments[2]))
}

/// Decode a token segment, tolerating both base64 alphabets.
///
/// Tokens are minted base64url without padding, but some relaying clients
/// re-encode with the standard alphabet. Both forms decode to the same
/// bytes, and the signed message uses the wire form verbatim either way.
fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD.decode(segment))
        .map_err(|_| AuthError::Malformed("credential segment is not valid base64".into()))
}

// =============================================================================
// UNIT TESTS
// =============================================================================
