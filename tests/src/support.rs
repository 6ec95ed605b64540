//! # Shared Test Fixtures
//!
//! Real credential material for the integration suites: throwaway secp256k1
//! wallets, an RSA identity provider whose key document can be served over
//! local HTTP, and a BLS capability network. Every fixture mints genuine
//! signatures; nothing here bypasses verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use k256::ecdsa::SigningKey;
use rand::RngCore;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use streamgate_auth::domain::capability::BLS_DST;
use streamgate_auth::domain::wallet::{address_from_pubkey, format_address};
use streamgate_auth::IdentityClaims;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// =============================================================================
// WALLETS
// =============================================================================

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// A throwaway wallet that signs personal messages like a browser wallet.
pub struct TestWallet {
    key: SigningKey,
    /// Canonical lowercase `0x`-hex account address.
    pub address: String,
}

impl TestWallet {
    /// Generate a fresh wallet.
    pub fn generate() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = format_address(&address_from_pubkey(key.verifying_key()));
        Self { key, address }
    }

    /// The address re-cased the way a sloppy client might claim it.
    pub fn shouting_address(&self) -> String {
        format!("0X{}", self.address[2..].to_uppercase())
    }

    /// Personal-sign a plaintext message, returning the 65-byte
    /// `r ‖ s ‖ v` hex form carried in the signature header.
    pub fn sign_personal(&self, message: &[u8]) -> String {
        let hash = streamgate_auth::hash_personal_message(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .expect("signing failed");

        let sig_bytes = signature.to_bytes();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig_bytes[..]);
        out[64] = recovery_id.to_byte() + 27;

        // Wallets emit low-S signatures; fold S and flip the recovery id
        // when the signer landed in the high half.
        let mut s = [0u8; 32];
        s.copy_from_slice(&sig_bytes[32..]);
        if s > SECP256K1_HALF_ORDER {
            out[32..64].copy_from_slice(&subtract_from_order(&s));
            out[64] = if recovery_id.to_byte() == 0 { 28 } else { 27 };
        }

        format!("0x{}", hex::encode(out))
    }
}

/// Compute n - s for low-S folding.
fn subtract_from_order(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// One shared RSA key for the whole test binary. 2048-bit generation is
/// slow enough that per-test keys would drag the suite.
struct ProviderRsa {
    pkcs1_der: Vec<u8>,
    n: String,
    e: String,
}

static PROVIDER_RSA: OnceLock<ProviderRsa> = OnceLock::new();

fn provider_rsa() -> &'static ProviderRsa {
    PROVIDER_RSA.get_or_init(|| {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("rsa keygen failed");
        let pkcs1_der = key
            .to_pkcs1_der()
            .expect("pkcs1 encoding failed")
            .as_bytes()
            .to_vec();
        let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
        ProviderRsa { pkcs1_der, n, e }
    })
}

/// Published key document naming every kid in `kids`, all backed by the
/// shared provider key.
pub fn keys_document(kids: &[&str]) -> String {
    let rsa = provider_rsa();
    let keys: Vec<serde_json::Value> = kids
        .iter()
        .map(|kid| {
            serde_json::json!({
                "kid": kid,
                "kty": "RSA",
                "alg": "RS256",
                "use": "sig",
                "n": rsa.n.as_str(),
                "e": rsa.e.as_str(),
            })
        })
        .collect();
    serde_json::json!({ "keys": keys }).to_string()
}

/// Sign an RS256 identity token binding `wallet` to `nonce`, expiring far
/// in the future.
pub fn mint_identity_token(kid: &str, wallet: &str, nonce: &str) -> String {
    mint_identity_token_with_exp(kid, wallet, nonce, Some(4_102_444_800))
}

/// Sign an identity token with an explicit expiry claim.
pub fn mint_identity_token_with_exp(
    kid: &str,
    wallet: &str,
    nonce: &str,
    exp: Option<i64>,
) -> String {
    let claims = IdentityClaims {
        wallet_address: wallet.to_string(),
        nonce: nonce.to_string(),
        exp,
        iss: Some("https://id.example.test".to_string()),
        sub: Some("user-7".to_string()),
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_der(&provider_rsa().pkcs1_der);
    encode(&header, &claims, &key).expect("token signing failed")
}

// =============================================================================
// CAPABILITY NETWORK
// =============================================================================

/// A throwaway BLS capability network: one signing key plus its compressed
/// G1 public key in the hex form the gateway config carries.
pub struct TestCapabilityNetwork {
    secret: blst::min_pk::SecretKey,
    /// Hex-encoded compressed public key, config-ready.
    pub public_key_hex: String,
}

impl TestCapabilityNetwork {
    /// Generate a fresh network key.
    pub fn generate() -> Self {
        let mut ikm = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ikm);
        let secret = blst::min_pk::SecretKey::key_gen(&ikm, &[]).expect("bls keygen failed");
        let public_key_hex = hex::encode(secret.sk_to_pk().to_bytes());
        Self {
            secret,
            public_key_hex,
        }
    }

    /// Mint a compact capability token over a raw payload JSON string.
    pub fn mint(&self, payload_json: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"BLS12-381","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
        let message = format!("{header}.{payload}");
        let signature = self.secret.sign(message.as_bytes(), BLS_DST, &[]);
        format!(
            "{message}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }

    /// Mint a token granting playback of one video until `exp`.
    pub fn mint_for_video(&self, video_id: &str, exp: i64) -> String {
        let extra = serde_json::json!({ "videoId": video_id }).to_string();
        let payload = serde_json::json!({
            "iss": "CAP",
            "iat": exp - 43_200,
            "exp": exp,
            "extraData": extra,
        })
        .to_string();
        self.mint(&payload)
    }
}

// =============================================================================
// LOCAL HTTP SERVERS
// =============================================================================

/// Serve one fixed JSON body to every connection, counting fetches.
///
/// Returns the document URL and the fetch counter.
pub async fn serve_json(body: String) -> (String, Arc<AtomicUsize>) {
    serve_json_sequence(vec![body]).await
}

/// Serve successive JSON bodies, one per fetch, sticking to the last once
/// the list runs out. Lets a test change the published key document
/// between fetches, the way a provider rotation does.
pub async fn serve_json_sequence(bodies: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let bodies = Arc::new(bodies);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let served = counter.fetch_add(1, Ordering::SeqCst);
            let bodies = bodies.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = &bodies[served.min(bodies.len() - 1)];
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/keys"), hits)
}

/// A port with nothing listening on it, for provider-outage tests.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/keys")
}
