//! Bearer token verification -> `AuthCtx` in request extensions.
//!
//! Runs on every request, allow-listed or not. A request carrying no bearer
//! credential continues without a context and is left to `authorize`. A
//! request carrying a credential that fails any check is answered with an
//! empty 403 here and never reaches the handlers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::{Authenticator, Outcome};

/// Apply the access middleware to `router`.
///
/// Must be added after `authorize::apply` so it runs first (the last layer
/// added is the outermost).
pub fn apply<S>(router: Router<S>, authenticator: Arc<Authenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        authenticator,
        access_middleware,
    ))
}

async fn access_middleware(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Already authenticated earlier in the pipeline
    if req.extensions().get::<AuthCtx>().is_some() {
        return next.run(req).await;
    }

    let outcome = authenticator.authenticate(req.headers(), Utc::now()).await;

    match outcome {
        Outcome::Passthrough => next.run(req).await,
        Outcome::Authenticated(auth_ctx) => {
            tracing::debug!(user_id = %auth_ctx.user_id, "request authenticated");
            req.extensions_mut().insert(auth_ctx);
            next.run(req).await
        }
        Outcome::Rejected(err) => {
            tracing::warn!(
                error = %err,
                method = %req.method(),
                path = %req.uri().path(),
                "bearer authentication rejected"
            );
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        http::{Method, header},
        routing::{get, post},
    };
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::config::SigningSecret;
    use crate::middleware::auth::{AllowList, authorize};
    use crate::services::auth::TokenService;
    use crate::services::auth::principal::testing::InMemoryPrincipalStore;

    const ALICE: &str = "alice@example.com";

    fn authenticator(store: InMemoryPrincipalStore) -> Arc<Authenticator> {
        let secret = SigningSecret::from_base64(&STANDARD.encode([5u8; 32])).unwrap();
        let tokens = Arc::new(TokenService::new(&secret, Duration::from_secs(3600)));
        Arc::new(Authenticator::new(tokens, Arc::new(store)))
    }

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        ctx.identifier
    }

    async fn anonymous(req: Request<Body>) -> &'static str {
        if req.extensions().get::<AuthCtx>().is_some() {
            "authenticated"
        } else {
            "anonymous"
        }
    }

    fn app(authenticator: Arc<Authenticator>) -> Router {
        let router = Router::new()
            .route("/api/v1/posts", get(whoami))
            .route("/api/v1/users/login", post(anonymous))
            .route("/health", get(anonymous));

        let router = authorize::apply(router, Arc::new(AllowList::default()));
        apply(router, authenticator)
    }

    fn request(method: Method, uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_reaches_protected_handler() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));
        let token = auth.tokens().issue(ALICE).unwrap();

        let response = app(auth)
            .oneshot(request(Method::GET, "/api/v1/posts", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, ALICE);
    }

    #[tokio::test]
    async fn protected_route_without_header_is_forbidden() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));

        let response = app(auth)
            .oneshot(request(Method::GET, "/api/v1/posts", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn allow_listed_route_without_header_is_admitted_anonymously() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));

        let response = app(auth.clone())
            .oneshot(request(Method::POST, "/api/v1/users/login", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");

        let response = app(auth)
            .oneshot(request(Method::GET, "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn preflight_is_never_gated() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));

        let response = app(auth)
            .oneshot(request(Method::OPTIONS, "/api/v1/posts", None))
            .await
            .unwrap();

        // Reaches the router (405 from the GET-only route), not the gate.
        assert_ne!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_token_is_forbidden_with_empty_body() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));

        let response = app(auth)
            .oneshot(request(Method::GET, "/api/v1/posts", Some("garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_even_on_allow_listed_route() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[ALICE]));

        let response = app(auth)
            .oneshot(request(Method::POST, "/api/v1/users/login", Some("garbage")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_principal_looks_like_any_other_rejection() {
        let auth = authenticator(InMemoryPrincipalStore::with(&[]));
        let token = auth.tokens().issue(ALICE).unwrap();

        let response = app(auth)
            .oneshot(request(Method::GET, "/api/v1/posts", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn existing_context_skips_reauthentication() {
        // The store is unreachable, so any lookup would reject the request.
        let auth = authenticator(InMemoryPrincipalStore::failing());
        let ctx = AuthCtx {
            user_id: Uuid::new_v4(),
            identifier: "bob@example.com".to_string(),
            authorities: Vec::new(),
        };

        let mut req = request(Method::GET, "/api/v1/posts", Some("garbage"));
        req.extensions_mut().insert(ctx);

        let response = app(auth).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "bob@example.com");
    }
}
