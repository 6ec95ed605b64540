//! # Identity Token Verification (RS256)
//!
//! Pure verification of provider-issued identity tokens: pick the signing
//! key by the token's `kid`, check the RS256 signature, decode the claims,
//! and compare the embedded nonce against the caller's challenge.
//!
//! Key material comes in through [`ProviderKey`] values; fetching and
//! caching them is the adapter layer's job, so everything in this module is
//! deterministic CPU work.
//!
//! ## Security Notes
//!
//! - Only RSA-family algorithms are accepted. A token whose header names
//!   anything else fails signature verification outright, so an HS256
//!   token keyed with the public modulus cannot be laundered through
//!   here.
//! - Claims are decoded by the same call that checks the signature; no
//!   claim value is surfaced from a token that did not verify.
//! - The nonce comparison is constant-time. Timing a stream of guesses
//!   against a captured token reveals nothing about the expected value.

use super::entities::{IdentityClaim, IdentityClaims, ProviderKey};
use super::errors::AuthError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use subtle::ConstantTimeEq;

/// Verification policy for identity tokens.
///
/// `reject_expired` is off by default: providers rotate these tokens on
/// their own schedule and the nonce already binds a token to one login
/// attempt. Switching it on requires an `exp` claim and rejects tokens
/// past it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityPolicy {
    /// Reject tokens whose `exp` claim is in the past.
    pub reject_expired: bool,
}

// =============================================================================
// TOKEN INSPECTION AND VERIFICATION
// =============================================================================

/// Read the key id out of a token's header without verifying anything.
///
/// Returns `Ok(None)` when the header decodes but names no key id; such
/// a token can never match a published key. Either way the result means
/// nothing until [`verify_with_key`] succeeds with the matching key.
pub fn token_key_id(token: &str) -> Result<Option<String>, AuthError> {
    let header = decode_header(token)
        .map_err(|_| AuthError::Malformed("token header is not decodable".into()))?;
    Ok(header.kid)
}

/// Verify a token's RSA signature with one provider key and decode its
/// claims.
pub fn verify_with_key(
    token: &str,
    key: &ProviderKey,
    policy: IdentityPolicy,
) -> Result<IdentityClaim, AuthError> {
    let decoding_key =
        DecodingKey::from_rsa_components(&key.n, &key.e).map_err(map_jwt_error)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
    validation.validate_aud = false;
    validation.validate_exp = policy.reject_expired;
    if !policy.reject_expired {
        validation.required_spec_claims.clear();
    }

    let data = decode::<IdentityClaims>(token, &decoding_key, &validation).map_err(map_jwt_error)?;

    Ok(IdentityClaim {
        claims: data.claims,
        raw: token.to_string(),
    })
}

/// Compare a verified claim's nonce against the caller-supplied challenge.
pub fn check_nonce(claim: &IdentityClaim, expected: &str) -> Result<(), AuthError> {
    if constant_time_eq(claim.nonce().as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::NonceMismatch)
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Collapse the JWT library's error surface onto the credential taxonomy.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AuthError {
    match error.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => AuthError::SignatureInvalid,
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => AuthError::Expired,
        _ => AuthError::Malformed(error.to_string()),
    }
}

/// Constant-time byte equality. Length differences still short-circuit;
/// only the content comparison is hardened.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// UNIT TESTS
// =============================================================================
