//! # Wallet Signature Verification (secp256k1)
//!
//! Pure domain logic for the direct-signature credential scheme: hash a
//! plaintext message under the Ethereum personal-message prefix, recover the
//! signer's public key from a recoverable (r, s, v) signature, and derive
//! the signer's 20-byte account address.
//!
//! ## Security Notes
//!
//! - The personal-message prefix domain-separates plaintext signatures from
//!   every other signed payload format; a signature captured here cannot be
//!   replayed as a transaction signature.
//! - **Recovery ID**: `v` is accepted as 0, 1, 27, or 28; anything else is
//!   rejected before touching the curve.
//! - Address derivation is Keccak-256 over the uncompressed public key with
//!   the SEC1 prefix stripped, low 20 bytes, rendered lowercase `0x`-hex.
//! - No I/O, fully deterministic.

use super::entities::{Address, EcdsaSignature};
use super::errors::AuthError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Prefix bound into every personal-message hash.
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Wire length of a recoverable signature: r (32) + s (32) + v (1).
const RPC_SIGNATURE_LEN: usize = 65;

// =============================================================================
// CORE RECOVERY FUNCTIONS
// =============================================================================

/// Recover the signer of a plaintext message from its hex-encoded signature.
///
/// This is the whole scheme-2 pipeline: [`parse_rpc_signature`], then
/// [`hash_personal_message`], then [`recover_address`]. The result is the
/// signer's address rendered as lowercase `0x`-hex, ready for the
/// case-insensitive comparison against the caller's claimed wallet.
pub fn recover_personal_signer(
    message: &[u8],
    encoded_signature: &str,
) -> Result<String, AuthError> {
    let signature = parse_rpc_signature(encoded_signature)?;
    let hash = hash_personal_message(message);
    let address = recover_address(&hash, &signature)?;
    Ok(format_address(&address))
}

/// Recover the signer's address from a 32-byte message hash and signature.
pub fn recover_address(
    message_hash: &[u8; 32],
    signature: &EcdsaSignature,
) -> Result<Address, AuthError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    // Construct the k256 signature from r || s. Zero or out-of-range
    // scalars are rejected here.
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| AuthError::SignatureInvalid)?;

    let recovered = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| AuthError::SignatureInvalid)?;

    Ok(address_from_pubkey(&recovered))
}

/// Parse a hex-encoded signature in the RPC layout `r ‖ s ‖ v`.
///
/// A leading `0x` is tolerated. Undecodable hex or a wrong byte length
/// fails `Malformed`.
pub fn parse_rpc_signature(encoded: &str) -> Result<EcdsaSignature, AuthError> {
    let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);
    let bytes = hex::decode(stripped)
        .map_err(|_| AuthError::Malformed("signature is not valid hex".into()))?;

    if bytes.len() != RPC_SIGNATURE_LEN {
        return Err(AuthError::Malformed(format!(
            "signature must be {RPC_SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..64]);

    Ok(EcdsaSignature { r, s, v: bytes[64] })
}

// =============================================================================
// HASHING AND ADDRESS DERIVATION
// =============================================================================

/// Keccak-256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hash a plaintext message under the personal-message prefix.
///
/// The digest covers the prefix, the message's decimal byte length, and the
/// message itself, so the length is bound into the hash as well.
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive the account address from a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of the public key (without the 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    // Take last 20 bytes as address
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Render an address as a lowercase `0x`-prefixed hex string.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a recovery id from the signature's `v` byte.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, AuthError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(AuthError::SignatureInvalid),
    };

    RecoveryId::try_from(id).map_err(|_| AuthError::SignatureInvalid)
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// UNIT TESTS
// =============================================================================
