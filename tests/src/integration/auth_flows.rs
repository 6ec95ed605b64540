//! # Credential Scheme Flows
//!
//! Drives the real `Authenticator` against a live local key endpoint.
//! Tokens carry genuine RSA signatures, the key document travels over
//! actual HTTP, and signatures come from freshly generated wallet keys,
//! exactly as the gateway's auth layer would see them.

#[cfg(test)]
mod tests {
    use crate::support;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use streamgate_auth::{
        AuthError, AuthOutcome, AuthRequest, Authenticate, Authenticator, HttpKeySource,
        IdentityPolicy,
    };

    /// Wallet the identity provider asserts, mixed-case as issued.
    const PROVIDER_WALLET: &str = "0x00AA11bb22CC33dd44Ee55Ff66aa77BB88cc99dD";

    fn token_request(token: &str, nonce: &str) -> AuthRequest {
        AuthRequest {
            id_token: Some(token.to_string()),
            nonce: Some(nonce.to_string()),
            ..AuthRequest::default()
        }
    }

    fn signature_request(message: &str, signature: &str, wallet: &str) -> AuthRequest {
        AuthRequest {
            message: Some(message.to_string()),
            signature: Some(signature.to_string()),
            wallet: Some(wallet.to_string()),
            ..AuthRequest::default()
        }
    }

    // =========================================================================
    // IDENTITY TOKENS OVER LIVE HTTP
    // =========================================================================

    #[tokio::test]
    async fn test_identity_token_flow_over_live_endpoint() {
        let (endpoint, _) = support::serve_json(support::keys_document(&["kid-live"])).await;
        let service = Authenticator::new(HttpKeySource::new(reqwest::Client::new(), endpoint));

        let token = support::mint_identity_token("kid-live", PROVIDER_WALLET, "nonce-http");
        let outcome = service
            .authenticate(&token_request(&token, "nonce-http"))
            .await;

        assert_eq!(
            outcome,
            AuthOutcome::Authenticated {
                wallet: "0x00aa11bb22cc33dd44ee55ff66aa77bb88cc99dd".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_key_document_cached_within_ttl() {
        let (endpoint, hits) = support::serve_json(support::keys_document(&["kid-live"])).await;
        let service = Authenticator::new(HttpKeySource::with_ttl(
            reqwest::Client::new(),
            endpoint,
            Duration::from_secs(300),
        ));

        for nonce in ["first", "second", "third"] {
            let token = support::mint_identity_token("kid-live", PROVIDER_WALLET, nonce);
            let outcome = service.authenticate(&token_request(&token, nonce)).await;
            assert!(outcome.is_authenticated());
        }

        // Three logins, one fetch.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rotated_kid_refetches_through_warm_cache() {
        // The cache fills from a document that predates kid-new; a token
        // minted under kid-new must force one refetch, not a rejection.
        let (endpoint, hits) = support::serve_json_sequence(vec![
            support::keys_document(&["kid-old"]),
            support::keys_document(&["kid-old", "kid-new"]),
        ])
        .await;
        let service = Authenticator::new(HttpKeySource::with_ttl(
            reqwest::Client::new(),
            endpoint,
            Duration::from_secs(300),
        ));

        // Warm the cache under the old document.
        let old = support::mint_identity_token("kid-old", PROVIDER_WALLET, "warm");
        let outcome = service.authenticate(&token_request(&old, "warm")).await;
        assert!(outcome.is_authenticated());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let new = support::mint_identity_token("kid-new", PROVIDER_WALLET, "rotated");
        let outcome = service.authenticate(&token_request(&new, "rotated")).await;

        assert!(outcome.is_authenticated());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_token_rejected_under_strict_policy() {
        let (endpoint, _) = support::serve_json(support::keys_document(&["kid-live"])).await;
        let service = Authenticator::with_policy(
            HttpKeySource::new(reqwest::Client::new(), endpoint),
            IdentityPolicy {
                reject_expired: true,
            },
        );

        let stale =
            support::mint_identity_token_with_exp("kid-live", PROVIDER_WALLET, "n", Some(1_000_000));
        let outcome = service.authenticate(&token_request(&stale, "n")).await;

        assert_eq!(
            outcome,
            AuthOutcome::Unauthenticated {
                reason: AuthError::Expired,
            }
        );
    }

    #[tokio::test]
    async fn test_provider_outage_rejects_identity_scheme() {
        let service = Authenticator::new(HttpKeySource::new(
            reqwest::Client::new(),
            support::dead_endpoint().await,
        ));
        let token = support::mint_identity_token("kid-live", PROVIDER_WALLET, "n");

        let outcome = service.authenticate(&token_request(&token, "n")).await;

        assert!(matches!(
            outcome,
            AuthOutcome::Unauthenticated {
                reason: AuthError::KeySourceUnavailable(_),
            }
        ));
    }

    // =========================================================================
    // WALLET SIGNATURES
    // =========================================================================

    #[tokio::test]
    async fn test_wallet_signature_flow_with_shouted_claim() {
        // No identity headers at all, so the key endpoint is never needed;
        // a dead one proves the signature scheme runs fully offline.
        let service = Authenticator::new(HttpKeySource::new(
            reqwest::Client::new(),
            support::dead_endpoint().await,
        ));

        let wallet = support::TestWallet::generate();
        let signature = wallet.sign_personal(b"gateway login");

        let outcome = service
            .authenticate(&signature_request(
                "gateway login",
                &signature,
                &wallet.shouting_address(),
            ))
            .await;

        assert_eq!(
            outcome,
            AuthOutcome::Authenticated {
                wallet: wallet.address.clone(),
            }
        );
    }
}
