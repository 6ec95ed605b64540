//! Throwaway wallet keys and personal-message signing.
//!
//! Signing mirrors what a browser wallet produces: the plaintext is hashed
//! under the personal-message prefix and the signature travels as 65 bytes
//! of `r ‖ s ‖ v` hex, with `v` in the 27/28 range.

use anyhow::{anyhow, Context};
use k256::ecdsa::SigningKey;
use streamgate_auth::domain::wallet::{address_from_pubkey, format_address};
use streamgate_auth::hash_personal_message;

/// One secp256k1 keypair plus its derived account address.
pub struct Wallet {
    key: SigningKey,
    /// Lowercase `0x`-hex account address.
    pub address: String,
}

impl Wallet {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        Self::from_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Load a wallet from a 32-byte hex private key. A leading `0x` is
    /// tolerated.
    pub fn from_hex(encoded: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(encoded.trim().trim_start_matches("0x"))
            .context("private key is not valid hex")?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| anyhow!("private key is not a valid secp256k1 scalar"))?;
        Ok(Self::from_key(key))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = format_address(&address_from_pubkey(key.verifying_key()));
        Self { key, address }
    }

    /// The private key as `0x`-hex, for reuse in later invocations.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }

    /// Personal-sign `message` and bundle the three credential headers the
    /// gateway's signature scheme reads.
    pub fn sign_headers(&self, message: &str) -> anyhow::Result<SignedHeaders> {
        let hash = hash_personal_message(message.as_bytes());
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|_| anyhow!("signing failed"))?;

        // The signer emits a self-consistent (S, v) pair; v only needs the
        // shift into the wallet-style 27/28 range.
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes()[..]);
        bytes[64] = recovery_id.to_byte() + 27;

        Ok(SignedHeaders {
            message: message.to_string(),
            signature: format!("0x{}", hex::encode(bytes)),
            wallet: self.address.clone(),
        })
    }
}

/// The three headers carrying one wallet-signature credential.
pub struct SignedHeaders {
    pub message: String,
    pub signature: String,
    pub wallet: String,
}

impl SignedHeaders {
    /// Attach the credential to an outgoing request.
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-auth-message", self.message.as_str())
            .header("x-auth-signature", self.signature.as_str())
            .header("x-auth-wallet", self.wallet.as_str())
    }

    /// Header lines for display, one per header.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("x-auth-message: {}", self.message),
            format!("x-auth-signature: {}", self.signature),
            format!("x-auth-wallet: {}", self.wallet),
        ]
    }
}
