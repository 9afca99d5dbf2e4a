//! # Tenet HTTP Client
//!
//! Thin wrapper around the Tenet HTTP host for use by the MCP server.

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot connect to Tenet at {0}")]
    ConnectionFailed(String),

    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,

    #[error("Rate limited: too many requests")]
    RateLimited,

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct DefineBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    result: String,
}

/// HTTP client for one Tenet host.
#[derive(Clone)]
pub struct TenetClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TenetClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request, map transport and status failures.
    ///
    /// 400, 422 and 500 from the host still carry a bridge result in the
    /// body. Auth, rate limiting and any other 5xx are client errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if status.is_server_error() && status != reqwest::StatusCode::INTERNAL_SERVER_ERROR {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        Ok(resp)
    }

    /// POST /define → `None` on success, the flattened error otherwise.
    pub async fn define(&self, program: &str) -> Result<Option<String>, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/define")
            .json(&json!({ "args": [program] }));
        let body: DefineBody = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(body.error)
    }

    /// POST /query → encoded results or the flattened error.
    pub async fn query(&self, query: &str) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/query")
            .json(&json!({ "args": [query] }));
        let body: QueryBody = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(body.result)
    }

    /// GET /status → session statistics.
    pub async fn status(&self) -> Result<Value, ClientError> {
        let req = self.request(reqwest::Method::GET, "/status");
        self.send(req)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}
