//! Per-request authentication decision.
//!
//! Kept free of axum types apart from `HeaderMap` so the whole state machine
//! can be driven from tests with a simulated clock. The middleware in
//! `middleware::auth::access` is a thin adapter over `Authenticator::authenticate`.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};

use crate::api::v1::extractors::AuthCtx;
use crate::repos::error::RepoError;
use crate::services::auth::principal::PrincipalStore;
use crate::services::auth::token::{TokenError, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

/// Why a presented credential was refused. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("principal store failure")]
    PrincipalStore(#[source] RepoError),
    #[error("token subject does not match principal")]
    SubjectMismatch,
}

#[derive(Debug)]
pub enum Outcome {
    /// No usable credential; the request continues without a context.
    Passthrough,
    /// Credential verified; the caller inserts this context once.
    Authenticated(AuthCtx),
    Rejected(AuthError),
}

pub struct Authenticator {
    tokens: Arc<TokenService>,
    principals: Arc<dyn PrincipalStore>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, principals: Arc<dyn PrincipalStore>) -> Self {
        Self { tokens, principals }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Signature, then principal lookup, then expiry, then subject match.
    /// Nothing from the token is trusted before the signature check passes.
    pub async fn authenticate(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Outcome {
        let Some(token) = bearer_token(headers) else {
            return Outcome::Passthrough;
        };

        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(err) => return Outcome::Rejected(err.into()),
        };

        let subject = TokenService::extract_subject(&claims);
        let principal = match self.principals.find_by_identifier(subject).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return Outcome::Rejected(AuthError::PrincipalNotFound),
            Err(err) => return Outcome::Rejected(AuthError::PrincipalStore(err)),
        };

        if TokenService::is_expired_at(&claims, now) {
            return Outcome::Rejected(TokenError::Expired.into());
        }

        if principal.identifier != subject {
            return Outcome::Rejected(AuthError::SubjectMismatch);
        }

        Outcome::Authenticated(AuthCtx::from_principal(principal))
    }
}

/// `Authorization: Bearer <token>`; anything else counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}
