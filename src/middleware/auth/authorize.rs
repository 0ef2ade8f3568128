//! Authorization gate: everything outside the allow-list needs an `AuthCtx`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;

/// Routes reachable without authentication.
#[derive(Debug, Clone)]
pub struct AllowList {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            exact: vec![
                "/api/v1/users/login".to_string(),
                "/api/v1/users/register".to_string(),
                "/health".to_string(),
            ],
            prefixes: vec!["/error".to_string()],
        }
    }
}

impl AllowList {
    /// Preflight requests are always allowed, whatever the path. A prefix
    /// matches itself and anything below it (`/error`, `/error/404`), not
    /// siblings such as `/errors`.
    pub fn permits(&self, method: &Method, path: &str) -> bool {
        if method == Method::OPTIONS {
            return true;
        }

        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| under_prefix(path, p))
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn apply<S>(router: Router<S>, allow_list: Arc<AllowList>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        allow_list,
        authorize_middleware,
    ))
}

async fn authorize_middleware(
    State(allow_list): State<Arc<AllowList>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthCtx>().is_some()
        || allow_list.permits(req.method(), req.uri().path())
    {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "unauthenticated request to protected route");
    StatusCode::FORBIDDEN.into_response()
}
