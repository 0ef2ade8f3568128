//! CORS policy for browser clients of the blog.
//!
//! Development answers any origin; production only the origins listed in
//! `CORS_ALLOWED_ORIGINS`. Credentials are never allowed: the bearer token
//! travels in the `Authorization` header, not in cookies.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AppEnv, Config};

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config.app_env, &config.cors_allowed_origins))
}

fn layer(app_env: AppEnv, allowed_origins: &[String]) -> CorsLayer {
    let base = match app_env {
        AppEnv::Production => {
            // An empty list allows nobody.
            let allowed: Vec<HeaderValue> = allowed_origins
                .iter()
                .filter_map(|s| HeaderValue::from_str(s).ok())
                .collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
        }
        AppEnv::Development => CorsLayer::new().allow_origin(Any),
    };

    base.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .max_age(PREFLIGHT_MAX_AGE)
}
