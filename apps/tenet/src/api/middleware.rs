//! # Request Throttling
//!
//! One global quota shared by every route. `TENET_RATE_LIMIT` sets requests
//! per second: unset means 100, `0` turns throttling off.

use super::types::ErrorResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Environment variable holding the request rate.
pub const RATE_LIMIT_ENV: &str = "TENET_RATE_LIMIT";

const DEFAULT_RPS: u32 = 100;

/// Shared quota handle.
pub type Throttle = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Requests per second for a raw setting; `None` disables throttling.
///
/// A value that is not a number keeps the default rather than opening the
/// host up.
pub fn parse_rate(raw: Option<&str>) -> Option<NonZeroU32> {
    let Some(raw) = raw.map(str::trim) else {
        return NonZeroU32::new(DEFAULT_RPS);
    };
    match raw.parse::<u32>() {
        Ok(rps) => NonZeroU32::new(rps),
        Err(e) => {
            tracing::warn!("{}={:?} is not a rate ({}), using {}", RATE_LIMIT_ENV, raw, e, DEFAULT_RPS);
            NonZeroU32::new(DEFAULT_RPS)
        }
    }
}

pub fn rate_from_env() -> Option<NonZeroU32> {
    parse_rate(std::env::var(RATE_LIMIT_ENV).ok().as_deref())
}

pub fn throttle(rps: NonZeroU32) -> Throttle {
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// 429 once the quota for the current second is spent.
pub async fn enforce_throttle(
    State(throttle): State<Throttle>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if throttle.check().is_ok() {
        return next.run(request).await;
    }
    tracing::warn!(path = %request.uri().path(), "request throttled");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new("too many requests")),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================
