//! # HTTP Service
//!
//! Transport seam between entity services and the network.
//!
//! Services describe requests relative to the server API root (`api/...`);
//! a `HttpTransport` resolves them against a server, executes them and
//! reports non-2xx statuses as `HttpError::Status`.

use crate::config::ConnectionProfile;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failure of an HTTP exchange, surfaced unchanged to callers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    /// The request never produced a response
    #[error("{message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("Http failure response for {url}: {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
        body: Option<Value>,
    },

    /// The response body was not the expected JSON
    #[error("Http failure during parsing for {url}: {message}")]
    Decode { url: String, message: String },

    /// The request could not be built
    #[error("Invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

impl HttpError {
    /// Human readable message, as shown in alerts
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status code when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::InvalidRequest { url, .. } => url,
        }
    }
}

/// Request description relative to the server API root
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Resource path such as `api/emprestimos/3`
    pub path: String,
    /// Query parameters, repeated keys allowed
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response as delivered by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Address that answered; empty until a transport fills it in
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// Header names are lower-cased
    pub headers: HashMap<String, String>,
    /// `None` for an empty body
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: canonical_reason(status).to_string(),
            headers: HashMap::new(),
            body,
        }
    }

    /// 200 response carrying `body`
    pub fn json(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Check if the status indicates success (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Executes API requests against a server
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError>;
}

/// `HttpTransport` backed by a reqwest client configured from a profile
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    user: Option<String>,
    password: Option<String>,
    token: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport for the server described by `profile`
    pub fn new(profile: &ConnectionProfile) -> Result<Self, HttpError> {
        tracing::debug!("Creating HTTP transport for {}", profile.server());
        let invalid = |message: String| HttpError::InvalidRequest {
            url: profile.server().to_string(),
            message,
        };

        let base_url = Url::parse(profile.server()).map_err(|e| invalid(e.to_string()))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in profile.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(format!("header '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("header value '{value}': {e}")))?;
            default_headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .default_headers(default_headers)
            .danger_accept_invalid_certs(profile.insecure());
        if let Some(timeout) = profile.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            user: profile.user().map(str::to_string),
            password: profile.password().map(str::to_string),
            token: profile.token().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path against the server root
    pub fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::InvalidRequest {
                url: path.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let url = self.resolve(&request.path)?;
        let url_text = url.to_string();
        tracing::debug!("{} {} params={:?}", request.method, url_text, request.params);

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        } else if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_ref());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("HTTP request failed: {}", e);
            HttpError::Transport {
                url: url_text.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect::<HashMap<_, _>>();
        let bytes = response.bytes().await.map_err(|e| HttpError::Transport {
            url: url_text.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!("Response {} ({} bytes) from {}", status, bytes.len(), url_text);

        let body = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Some(value),
                // error pages are often not JSON; keep the status error meaningful
                Err(_) if !status.is_success() => {
                    Some(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Err(e) => {
                    return Err(HttpError::Decode {
                        url: url_text,
                        message: e.to_string(),
                    })
                }
            }
        };

        if !status.is_success() {
            tracing::warn!("{} {} answered {}", request.method, url_text, status);
            return Err(HttpError::Status {
                url: url_text,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        Ok(ApiResponse {
            url: url_text,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}
