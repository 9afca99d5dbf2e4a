//! # API Key Guard
//!
//! When `TENET_API_KEY` is set, `/status`, `/define` and `/query` need
//!
//! ```text
//! Authorization: Bearer <key>
//! ```
//!
//! `/health` sits outside the guard. The key is read once, when the router
//! is built.

use super::types::ErrorResponse;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TENET_API_KEY";

/// The key callers must present.
#[derive(Clone)]
pub struct ApiKey(Arc<[u8]>);

impl ApiKey {
    /// `None` for an empty key, which leaves the host open.
    pub fn new(key: &str) -> Option<Self> {
        (!key.is_empty()).then(|| Self(Arc::from(key.as_bytes())))
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV).ok().and_then(|k| Self::new(&k))
    }

    /// Compare in constant time. A candidate of the wrong length is swapped
    /// for the key itself, so the comparison always covers the same bytes.
    pub fn accepts(&self, presented: &str) -> bool {
        let presented = presented.as_bytes();
        let same_len = presented.len() == self.0.len();
        let candidate: &[u8] = if same_len { presented } else { &self.0[..] };
        let equal: bool = candidate.ct_eq(&self.0[..]).into();
        equal && same_len
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

/// Key carried by the request: the Bearer token, or the raw header value.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Reject calls that do not present the configured key.
pub async fn require_api_key(
    State(key): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let verdict = match presented_key(request.headers()) {
        Some(presented) if key.accepts(presented) => None,
        Some(_) => Some("invalid_api_key"),
        None => Some("missing_authorization_header"),
    };

    match verdict {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(
                event = "auth_failure",
                reason,
                path = %request.uri().path(),
                "call rejected"
            );
            (
                StatusCode::UNAUTHORIZED,
                axum::Json(ErrorResponse::new("unauthorized")),
            )
                .into_response()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
