//! # Gateway End-to-End Flows
//!
//! Full-router tests with nothing mocked below the video host port: real
//! credential dispatch through the auth layer, a live local key endpoint,
//! and genuine BLS capability tokens minted against a throwaway network
//! key.

#[cfg(test)]
mod tests {
    use crate::support::{self, TestCapabilityNetwork, TestWallet};
    use axum::body::{Body, Bytes};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use http_body_util::BodyExt;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};
    use streamgate_auth::{Authenticator, HttpKeySource};
    use streamgate_gateway::adapters::MemoryStore;
    use streamgate_gateway::ports::{
        DirectUploadRequest, HostError, UpstreamResponse, VideoHost, VideoStore,
    };
    use streamgate_gateway::{GatewayConfig, GatewayService};
    use tower::ServiceExt;

    /// Wallet the identity provider asserts, mixed-case as issued.
    const PROVIDER_WALLET: &str = "0x00AA11bb22CC33dd44Ee55Ff66aa77BB88cc99dD";

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Video host double answering with a canned reply and recording calls.
    struct RecordingHost {
        status: StatusCode,
        body: &'static str,
        playback: Mutex<Vec<(String, i64)>>,
        uploads: Mutex<Vec<DirectUploadRequest>>,
    }

    impl RecordingHost {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status: StatusCode::from_u16(status).unwrap(),
                body,
                playback: Mutex::new(Vec::new()),
                uploads: Mutex::new(Vec::new()),
            })
        }

        fn reply(&self) -> UpstreamResponse {
            UpstreamResponse {
                status: self.status,
                body: Bytes::from_static(self.body.as_bytes()),
            }
        }
    }

    #[async_trait::async_trait]
    impl VideoHost for RecordingHost {
        async fn playback_token(
            &self,
            video_id: &str,
            expires_at: i64,
        ) -> Result<UpstreamResponse, HostError> {
            self.playback.lock().push((video_id.to_string(), expires_at));
            Ok(self.reply())
        }

        async fn video_details(&self, _video_id: &str) -> Result<UpstreamResponse, HostError> {
            Ok(self.reply())
        }

        async fn direct_upload(
            &self,
            request: &DirectUploadRequest,
        ) -> Result<UpstreamResponse, HostError> {
            self.uploads.lock().push(request.clone());
            Ok(self.reply())
        }
    }

    /// Build a router over a live local key endpoint serving `kid-live`.
    ///
    /// The store is returned alongside so tests can inspect what the
    /// handlers persisted.
    async fn live_gateway(
        config: GatewayConfig,
        host: Arc<RecordingHost>,
    ) -> (Router, Arc<MemoryStore>) {
        let (endpoint, _) = support::serve_json(support::keys_document(&["kid-live"])).await;
        let authenticator = Arc::new(Authenticator::new(HttpKeySource::new(
            reqwest::Client::new(),
            endpoint,
        )));
        let store = Arc::new(MemoryStore::new());
        let service = GatewayService::new(config, authenticator, store.clone(), host).unwrap();
        (service.router(), store)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn unix_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    // =========================================================================
    // PUBLISH FLOW
    // =========================================================================

    #[tokio::test]
    async fn test_identity_token_publishes_to_catalog() {
        let host = RecordingHost::new(200, "{}");
        let (router, store) = live_gateway(GatewayConfig::default(), host).await;

        let token = support::mint_identity_token("kid-live", PROVIDER_WALLET, "login-1");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/kv/videos")
            .header("x-auth-jwt", token.as_str())
            .header("x-auth-nonce", "login-1")
            .body(Body::from(r#"{"id":"vid-1","title":"first"}"#))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");

        // The catalog entry carries the provider wallet folded to lowercase.
        let listing = router.oneshot(get("/kv/videos")).await.unwrap();
        let body = body_json(listing).await;
        assert_eq!(body["data"][0]["id"], "vid-1");
        assert_eq!(
            body["data"][0]["wallet"],
            "0x00aa11bb22cc33dd44ee55ff66aa77bb88cc99dd"
        );

        assert_eq!(
            store
                .get("users:0x00aa11bb22cc33dd44ee55ff66aa77bb88cc99dd:videos")
                .await
                .unwrap()
                .as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_identity_rejection_is_bare_401() {
        let host = RecordingHost::new(200, "{}");
        let (router, _) = live_gateway(GatewayConfig::default(), host).await;

        // A genuine token presented with the wrong nonce challenge.
        let token = support::mint_identity_token("kid-live", PROVIDER_WALLET, "right");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/kv/videos")
            .header("x-auth-jwt", token.as_str())
            .header("x-auth-nonce", "wrong")
            .body(Body::from("{}"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_quota_closes_after_limit() {
        let mut config = GatewayConfig::default();
        config.quota.max_videos = 0;

        let host = RecordingHost::new(200, "{}");
        let (router, _) = live_gateway(config, host).await;

        let wallet = TestWallet::generate();
        let signature = wallet.sign_personal(b"publish");
        let post = |body: &'static str| {
            Request::builder()
                .method(Method::POST)
                .uri("/kv/videos")
                .header("x-auth-message", "publish")
                .header("x-auth-signature", signature.as_str())
                .header("x-auth-wallet", wallet.address.as_str())
                .body(Body::from(body))
                .unwrap()
        };

        // First publish: a counter of 0 is not past a limit of 0.
        let response = router
            .clone()
            .oneshot(post(r#"{"id":"vid-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Second publish: a counter of 1 is.
        let response = router
            .clone()
            .oneshot(post(r#"{"id":"vid-2"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "You have reached your upload limit." })
        );

        // The same counter gates upload links.
        let link = Request::builder()
            .uri("/upload/link")
            .header("x-auth-message", "publish")
            .header("x-auth-signature", signature.as_str())
            .header("x-auth-wallet", wallet.address.as_str())
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(link).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // =========================================================================
    // UPLOAD AND PLAYBACK FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_wallet_signature_opens_upload_link() {
        let host = RecordingHost::new(
            200,
            r#"{"result":{"uploadURL":"https://upload.example/slot-1"}}"#,
        );
        let (router, _) = live_gateway(GatewayConfig::default(), host.clone()).await;

        let wallet = TestWallet::generate();
        let signature = wallet.sign_personal(b"open an upload slot");

        let request = Request::builder()
            .uri("/upload/link")
            .header("x-auth-message", "open an upload slot")
            .header("x-auth-signature", signature.as_str())
            .header("x-auth-wallet", wallet.shouting_address().as_str())
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            r#"{"result":{"uploadURL":"https://upload.example/slot-1"}}"#
        );

        let uploads = host.uploads.lock();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].require_signed_urls);
    }

    #[tokio::test]
    async fn test_capability_token_mints_playback_credential() {
        let network = TestCapabilityNetwork::generate();
        let mut config = GatewayConfig::default();
        config.capability.network_pubkey = network.public_key_hex.clone();

        let host = RecordingHost::new(200, r#"{"result":{"token":"playback-jwt"}}"#);
        let (router, _) = live_gateway(config, host.clone()).await;

        let now = unix_now();
        let token = network.mint_for_video("vid-9", now + 86_400);
        let request = Request::builder()
            .uri("/videos/presigned-url")
            .header("x-lit-jwt", token.as_str())
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            r#"{"result":{"token":"playback-jwt"}}"#
        );

        let playback = host.playback.lock();
        assert_eq!(playback.len(), 1);
        assert_eq!(playback[0].0, "vid-9");
        // The playback window is twelve hours from issuance.
        let twelve_hours = 12 * 3600;
        assert!(playback[0].1 >= now + twelve_hours);
        assert!(playback[0].1 <= now + twelve_hours + 5);
    }

    #[tokio::test]
    async fn test_foreign_network_capability_rejected() {
        let network = TestCapabilityNetwork::generate();
        let imposter = TestCapabilityNetwork::generate();
        let mut config = GatewayConfig::default();
        config.capability.network_pubkey = network.public_key_hex.clone();

        let host = RecordingHost::new(200, "{}");
        let (router, _) = live_gateway(config, host.clone()).await;

        let forged = imposter.mint_for_video("vid-9", unix_now() + 86_400);
        let request = Request::builder()
            .uri("/videos/presigned-url")
            .header("x-lit-jwt", forged.as_str())
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "");
        assert!(host.playback.lock().is_empty());
    }

    // =========================================================================
    // CORS
    // =========================================================================

    #[tokio::test]
    async fn test_cors_preflight_for_configured_origin() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origin = "https://player.example.com".to_string();

        let host = RecordingHost::new(200, "{}");
        let (router, _) = live_gateway(config, host).await;

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/kv/videos")
            .header(header::ORIGIN, "https://player.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = router.clone().oneshot(preflight).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://player.example.com")
        );
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(methods.contains("POST"));

        // Simple requests get the origin echoed as well.
        let listing = Request::builder()
            .uri("/kv/videos")
            .header(header::ORIGIN, "https://player.example.com")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(listing).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://player.example.com")
        );
    }
}
