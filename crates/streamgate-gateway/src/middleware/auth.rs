//! Wallet authentication middleware.
//!
//! Wraps the protected routes in a tower layer that runs the credential
//! dispatcher from `streamgate-auth`. A request that proves control of a
//! wallet continues inward with [`AuthenticatedWallet`] attached; anything
//! else is answered with a bare 401 and never reaches a handler.
//!
//! ## Security Notes
//!
//! The rejection response carries no body and no diagnostic header. Which
//! scheme failed, and why, is only ever logged at debug level.

use crate::middleware::metrics::GatewayMetrics;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::Response,
};
use std::sync::Arc;
use streamgate_auth::{AuthOutcome, AuthRequest, Authenticate};
use tower::{Layer, Service};
use tracing::debug;

/// Wallet identity proven by the authentication layer.
///
/// Inserted as a request extension for downstream handlers. Always the
/// canonical lowercase `0x`-hex form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedWallet(pub String);

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<dyn Authenticate>,
    metrics: Arc<GatewayMetrics>,
}

impl AuthLayer {
    pub fn new(authenticator: Arc<dyn Authenticate>, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            authenticator,
            metrics,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    authenticator: Arc<dyn Authenticate>,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        let metrics = Arc::clone(&self.metrics);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let credentials = extract_credentials(req.headers());

            match authenticator.authenticate(&credentials).await {
                AuthOutcome::Authenticated { wallet } => {
                    req.extensions_mut().insert(AuthenticatedWallet(wallet));
                    inner.call(req).await
                }
                AuthOutcome::Unauthenticated { reason } => {
                    debug!(%reason, path = %req.uri().path(), "request rejected");
                    metrics.record_unauthorized();
                    Ok(unauthorized_response())
                }
            }
        })
    }
}

/// Pull both credential schemes' headers off a request.
///
/// Values that are not valid UTF-8 read as absent, which downgrades the
/// request to whatever scheme remains.
fn extract_credentials(headers: &HeaderMap) -> AuthRequest {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    AuthRequest {
        id_token: header("x-auth-jwt"),
        nonce: header("x-auth-nonce"),
        message: header("x-auth-message"),
        signature: header("x-auth-signature"),
        wallet: header("x-auth-wallet"),
    }
}

/// Create the bare 401 rejection
pub fn unauthorized_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}
