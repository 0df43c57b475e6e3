//! HTTP client boundary for the staffdesk REST backend
//!
//! Every request goes through the same pipeline:
//! - request interception attaches `Authorization: Bearer <token>` when the
//!   session store holds a token
//! - a fixed timeout (15 s by default) bounds each call
//! - response interception is a pass-through that only traces failures
//!
//! Non-2xx responses become [`ApiError::Status`]; a request that never got a
//! response becomes [`ApiError::Network`].

use std::sync::Arc;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Multipart payloads are not accepted by /{0}")]
    MultipartUnsupported(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
}

impl ApiError {
    /// Status code, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Server-supplied `message` field, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Body shape most backend errors use
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// REST client bound to one session store
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client with the configured base URL and timeout
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .user_agent(concat!("staffdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Builder)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Start a request to `path` (relative to the base URL), with the
    /// bearer token attached if one is stored
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Send and decode a JSON response. An empty success body (204, or a
    /// bare 200) decodes as JSON `null`.
    pub async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.dispatch(req).await?;
        let bytes = resp.bytes().await.map_err(ApiError::Network)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and return the raw body, never parsed
    pub async fn execute_bytes(&self, req: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let resp = self.dispatch(req).await?;
        Ok(resp.bytes().await.map_err(ApiError::Network)?.to_vec())
    }

    /// Send and discard the body
    pub async fn execute_empty(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.dispatch(req).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, path)).await
    }

    // Private helpers

    async fn dispatch(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let result = match req.send().await {
            Ok(resp) => check_status(resp).await,
            Err(e) => Err(ApiError::Network(e)),
        };
        intercept_response(result)
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    tracing::debug!("{} {}", status.as_u16(), resp.url().path());

    if status.is_success() {
        return Ok(resp);
    }

    let message = resp
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
        .and_then(|body| body.message);

    Err(ApiError::Status { status, message })
}

/// Global response hook. Currently passes everything through unchanged.
fn intercept_response(result: Result<Response, ApiError>) -> Result<Response, ApiError> {
    if let Err(ref e) = result {
        tracing::debug!("Request failed: {}", e);
    }
    result
}
