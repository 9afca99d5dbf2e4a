//! # Tenet HTTP API Module
//!
//! The HTTP host: each endpoint is one bridge call.
//!
//! ## Endpoints
//!
//! - `POST /define` - `{"args": [program]}` → `{"error": null | "..."}`
//! - `POST /query` - `{"args": [query]}` → `{"result": "..."}`
//! - `GET /status` - Session statistics and output mode
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `TENET_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `TENET_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `TENET_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{API_KEY_ENV, ApiKey};
pub use handlers::{define_handler, health_handler, query_handler, status_handler};
pub use middleware::{RATE_LIMIT_ENV, Throttle, parse_rate, rate_from_env, throttle};
pub use types::{
    CallRequest, DefineResponse, ErrorResponse, HealthResponse, QueryResponse, StatusResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tenet_core::primitives::MAX_PROGRAM_LENGTH;
use tenet_core::{Bridge, TenetError};
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Environment variable listing allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "TENET_CORS_ORIGINS";

/// Browser origins allowed when nothing else is configured.
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. Defines take the write lock, queries the read lock.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<RwLock<Bridge>>,
}

impl AppState {
    #[must_use]
    pub fn new(bridge: Bridge) -> Self {
        Self {
            bridge: Arc::new(RwLock::new(bridge)),
        }
    }
}

// =============================================================================
// CORS
// =============================================================================

/// Which browser origins may call the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origins {
    Any,
    Listed(Vec<HeaderValue>),
}

impl Origins {
    /// Read a `TENET_CORS_ORIGINS` value: `*`, or a comma-separated list.
    /// Unset, or a list with no usable entry, means the local origins.
    pub fn parse(raw: Option<&str>) -> Self {
        if raw.map(str::trim) == Some("*") {
            return Self::Any;
        }
        let listed: Vec<HeaderValue> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            // a wildcard only counts on its own
            .filter(|o| !o.is_empty() && *o != "*")
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("ignoring CORS origin {:?}: {}", o, e);
                    None
                }
            })
            .collect();
        if listed.is_empty() {
            Self::local()
        } else {
            Self::Listed(listed)
        }
    }

    fn local() -> Self {
        Self::Listed(
            LOCAL_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect(),
        )
    }

    fn layer(self) -> CorsLayer {
        let allow = match self {
            Self::Any => {
                tracing::warn!("{}=*: any origin may call this host", CORS_ORIGINS_ENV);
                AllowOrigin::any()
            }
            Self::Listed(origins) => AllowOrigin::list(origins),
        };
        CorsLayer::new()
            .allow_origin(allow)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the router, reading the security settings from the environment.
///
/// `/health` is always public. The call routes sit behind the API key guard
/// (when a key is set) and the whole router behind the throttle (unless
/// disabled), the body limit, CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let origins = Origins::parse(std::env::var(CORS_ORIGINS_ENV).ok().as_deref());

    let mut calls = Router::new()
        .route("/status", get(handlers::status_handler))
        .route("/define", post(handlers::define_handler))
        .route("/query", post(handlers::query_handler));

    match ApiKey::from_env() {
        Some(key) => {
            tracing::info!("API key required for call routes");
            calls = calls.route_layer(from_fn_with_state(key, auth::require_api_key));
        }
        None => tracing::warn!("{} not set: call routes are open to anyone", API_KEY_ENV),
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(calls);

    match rate_from_env() {
        Some(rps) => {
            tracing::info!("throttling at {} requests/second", rps);
            router = router.layer(from_fn_with_state(
                throttle(rps),
                middleware::enforce_throttle,
            ));
        }
        None => tracing::info!("throttling disabled"),
    }

    // program text may double in size once JSON-escaped
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * MAX_PROGRAM_LENGTH))
        .layer(origins.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Start the HTTP server. Returns after Ctrl+C.
pub async fn run_server(addr: &str, bridge: Bridge) -> Result<(), TenetError> {
    let state = AppState::new(bridge);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TenetError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Tenet HTTP host listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TenetError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================
