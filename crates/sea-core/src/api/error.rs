//! Errors returned by the backend client.

use std::fmt;

use reqwest::StatusCode;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The backend answered with a non-success HTTP status
    HttpStatus,
    /// No response was received (connection refused, DNS, timeout)
    Transport,
    /// A success response whose body did not match the expected shape
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// Error from a backend request.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, for `HttpStatus` errors
    pub status: Option<u16>,
    /// Raw response body or underlying error text, when available
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new client error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates an HTTP status error, e.g. `Request failed: 500 Internal Server Error`.
    ///
    /// The body is kept in `details` but stays out of the message.
    pub fn http_status(status: StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("");
        let message = format!("Request failed: {} {reason}", status.as_u16())
            .trim_end()
            .to_string();
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            status: Some(status.as_u16()),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a transport error.
    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the SEA backend".to_string()
        } else {
            "Request could not be sent".to_string()
        };
        Self {
            kind: ApiErrorKind::Transport,
            message,
            status: None,
            details: Some(err.to_string()),
        }
    }

    /// Creates a decode error for a response that parsed badly.
    pub fn decode(what: &str, err: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: format!("Failed to parse {what} response"),
            status: None,
            details: Some(err.to_string()),
        }
    }

    /// Returns the HTTP status code, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether the backend rejected the credentials or session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
