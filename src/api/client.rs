use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

const SERVER_SEGMENTS: [&str; 2] = ["servers", "localhost"];

/// A single call against the management API, relative to the base URI.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<Value>,
    pub if_match: Option<String>,
}

impl ApiRequest {
    /// `servers/localhost/zones`
    pub fn zones(method: Method) -> Self {
        Self::under_server(method, &["zones"])
    }

    /// `servers/localhost/zones/{id}`
    pub fn zone(method: Method, id: &str) -> Self {
        Self::under_server(method, &["zones", id])
    }

    fn under_server(method: Method, tail: &[&str]) -> Self {
        let segments = SERVER_SEGMENTS
            .iter()
            .chain(tail)
            .map(|segment| segment.to_string())
            .collect();

        Self {
            method,
            segments,
            body: None,
            if_match: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// What came back over the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            etag: None,
            body: body.into(),
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connect => "connection failed",
            Self::Timeout => "request timed out",
            Self::Other => "transport error",
        })
    }
}

/// The request never produced an HTTP response. Displays as
/// `"<kind>: <message>"`, which is what ends up in [`crate::ApiResult::Failure`].
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, error.to_string())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}
