//! HS256 bearer tokens: issue, verify, expiry.
//!
//! Verification is split in two: `verify` checks the algorithm and signature
//! only, `is_expired_at` is applied to claims that already passed `verify`.

use std::collections::HashSet;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SigningSecret;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("unsupported token algorithm")]
    Unsupported,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token")]
    Signing,
}

/// Claims carried by every token this service issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Seconds since epoch.
    pub iat: i64,
    /// Seconds since epoch.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validity", &self.validity)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &SigningSecret, validity: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `is_expired_at` after the signature is known good.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "iat".to_string(), "exp".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Sign a token for `subject` valid from `now` for the configured window.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        // Windows under one second still have to satisfy exp > iat.
        let window = i64::try_from(self.validity.as_secs()).unwrap_or(i64::MAX).max(1);

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(window),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            TokenError::Signing
        })
    }

    /// Check structure, algorithm and signature. Expiry is NOT checked here.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(token, e.kind()))
    }

    /// `verify` followed by the expiry check at `now`. The request path runs the
    /// two steps separately (principal lookup sits in between).
    #[cfg(test)]
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if Self::is_expired_at(&claims, now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    #[cfg(test)]
    pub fn is_expired(claims: &Claims) -> bool {
        Self::is_expired_at(claims, Utc::now())
    }

    /// A token whose `exp` equals `now` is already expired.
    pub fn is_expired_at(claims: &Claims, now: DateTime<Utc>) -> bool {
        claims.exp <= now.timestamp()
    }

    pub fn extract_subject(claims: &Claims) -> &str {
        &claims.sub
    }
}

fn classify(token: &str, kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => TokenError::Unsupported,
        // `alg: none` and other unknown names fail header deserialization.
        ErrorKind::Json(_) if names_foreign_alg(token) => TokenError::Unsupported,
        // Sound header and claims: whatever failed is the signature segment itself.
        _ if only_signature_undecodable(token) => TokenError::BadSignature,
        _ => TokenError::Malformed,
    }
}

fn decode_json_segment(segment: &str) -> Option<serde_json::Value> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

// True for `<HS256 header>.<JSON claims>.<signature that is not canonical base64url>`.
fn only_signature_undecodable(token: &str) -> bool {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return false;
    };

    let header_ok = decode_json_segment(header)
        .is_some_and(|h| h.get("alg").and_then(|alg| alg.as_str()) == Some("HS256"));
    let claims_ok = decode_json_segment(claims).is_some_and(|c| c.is_object());

    header_ok && claims_ok && URL_SAFE_NO_PAD.decode(signature).is_err()
}

// True when the header segment is valid JSON naming an algorithm other than HS256.
fn names_foreign_alg(token: &str) -> bool {
    let Some(header) = token.split('.').next() else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(header) else {
        return false;
    };
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return false;
    };

    value
        .get("alg")
        .and_then(|alg| alg.as_str())
        .is_some_and(|alg| alg != "HS256")
}
