//! # Authentication Middleware
//!
//! Optional bearer-token authentication over the API surface. When no
//! token is configured the middleware passes everything through — the
//! deployment is then expected to sit behind its own perimeter. Health
//! probes and `/metrics` are mounted outside this middleware and stay
//! unauthenticated.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use subtle::ConstantTimeEq;

use crate::error::{ErrorBody, ErrorDetail};

/// A bearer token that never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Constant-time comparison against a presented candidate.
    ///
    /// Length differences short-circuit, which leaks only the length —
    /// acceptable for bearer tokens of fixed deployment-chosen size.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = candidate.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected.ct_eq(presented).into()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(..)")
    }
}

/// Auth configuration injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The expected bearer token; `None` disables authentication.
    pub token: Option<SecretString>,
}

/// Bearer-token middleware.
pub async fn auth_middleware(
    Extension(config): Extension<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = &config.token else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if expected.verify(token) => next.run(request).await,
        _ => unauthorized("missing or invalid bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_exact_match() {
        let secret = SecretString::new("zone-token-1");
        assert!(secret.verify("zone-token-1"));
    }

    #[test]
    fn verify_rejects_mismatch_and_prefix() {
        let secret = SecretString::new("zone-token-1");
        assert!(!secret.verify("zone-token-2"));
        assert!(!secret.verify("zone-token"));
        assert!(!secret.verify(""));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let secret = SecretString::new("super-secret");
        assert_eq!(format!("{secret:?}"), "SecretString(..)");
    }
}
