//! Error types for the Nylas client.
//!
//! Every fallible operation in the crate returns [`NylasError`]. Failures that
//! carry an HTTP status are classified into a closed set of [`ErrorKind`]s so
//! callers can branch on the kind instead of parsing message text.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for Nylas operations.
pub type NylasResult<T> = Result<T, NylasError>;

/// Discriminant identifying a class of request failure.
///
/// The HTTP-derived kinds are listed in status-code order. New kinds are only
/// ever appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client construction or request building failed on local configuration.
    Configuration,
    /// The network exchange failed before a usable HTTP status was received.
    Transport,
    /// A request or response body did not match the expected shape.
    Serialization,
    /// HTTP 400.
    InvalidRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 402.
    PaymentRequired,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 405.
    MethodNotAllowed,
    /// HTTP 406.
    NotAcceptable,
    /// HTTP 408.
    RequestTimeout,
    /// HTTP 409.
    Conflict,
    /// HTTP 422.
    UnprocessableEntity,
    /// HTTP 429.
    RateLimited,
    /// Any other 4xx status.
    ClientError,
    /// Any 5xx status.
    ServerError,
}

impl ErrorKind {
    /// Classifies an HTTP status code.
    ///
    /// Returns `None` for statuses outside the 4xx and 5xx ranges.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            400 => Self::InvalidRequest,
            401 => Self::Unauthorized,
            402 => Self::PaymentRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            422 => Self::UnprocessableEntity,
            429 => Self::RateLimited,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => return None,
        };
        Some(kind)
    }

    /// Message used when the server does not supply one.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Configuration => "The client is not configured correctly.",
            Self::Transport => "The request could not be delivered to the server.",
            Self::Serialization => "The response body did not match the expected shape.",
            Self::InvalidRequest => {
                "The request could not be understood or was missing required parameters."
            }
            Self::Unauthorized => "Authentication failed or was not provided.",
            Self::PaymentRequired => {
                "The request failed because of a billing issue with the account."
            }
            Self::Forbidden => "You do not have permission to access this resource.",
            Self::NotFound => "The requested resource could not be found.",
            Self::MethodNotAllowed => "You tried to access a resource with an invalid method.",
            Self::NotAcceptable => "You requested a format that is not supported.",
            Self::RequestTimeout => "The server timed out waiting for the request.",
            Self::Conflict => "The request conflicts with the current state of the resource.",
            Self::UnprocessableEntity => {
                "The request was well-formed but contained semantic errors."
            }
            Self::RateLimited => "Too many requests.",
            Self::ClientError => "The request failed with a client error.",
            Self::ServerError => "The server encountered an error.",
        }
    }

    /// Returns true for kinds derived from an HTTP 4xx/5xx status.
    pub fn is_http(self) -> bool {
        !matches!(
            self,
            Self::Configuration | Self::Transport | Self::Serialization
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Serialization => "serialization",
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "unauthorized",
            Self::PaymentRequired => "payment required",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::NotAcceptable => "not acceptable",
            Self::RequestTimeout => "request timeout",
            Self::Conflict => "conflict",
            Self::UnprocessableEntity => "unprocessable entity",
            Self::RateLimited => "rate limited",
            Self::ClientError => "client error",
            Self::ServerError => "server error",
        };
        f.write_str(name)
    }
}

/// Error type for Nylas client operations.
#[derive(Debug, Clone, Error)]
pub enum NylasError {
    /// Configuration error (missing credentials, unknown region, bad URL).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Network failure, or a status that is neither success nor 4xx/5xx.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Status code, when the server answered with an unexpected one.
        status_code: Option<u16>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
        /// Status of the response whose body failed to decode.
        status_code: Option<u16>,
    },

    /// The API answered with a 4xx or 5xx status.
    #[error("API error (HTTP {status_code}, {kind}): {message}")]
    Api {
        /// Classification of the status code.
        kind: ErrorKind,
        /// HTTP status code.
        status_code: u16,
        /// Server-supplied message, or the kind's default.
        message: String,
        /// Request ID for support tickets.
        request_id: Option<String>,
        /// Parsed `Retry-After` header.
        retry_after: Option<Duration>,
    },
}

impl NylasError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NylasError::Configuration { .. } => ErrorKind::Configuration,
            NylasError::Transport { .. } => ErrorKind::Transport,
            NylasError::Serialization { .. } => ErrorKind::Serialization,
            NylasError::Api { kind, .. } => *kind,
        }
    }

    /// Returns the HTTP status code, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NylasError::Configuration { .. } => None,
            NylasError::Transport { status_code, .. }
            | NylasError::Serialization { status_code, .. } => *status_code,
            NylasError::Api { status_code, .. } => Some(*status_code),
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            NylasError::Configuration { message }
            | NylasError::Transport { message, .. }
            | NylasError::Serialization { message, .. }
            | NylasError::Api { message, .. } => message,
        }
    }

    /// Returns the request ID reported by the server.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            NylasError::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            NylasError::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns true if a caller may reasonably retry the request.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited
                | ErrorKind::ServerError
                | ErrorKind::RequestTimeout
                | ErrorKind::Transport
        )
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        NylasError::Configuration {
            message: message.into(),
        }
    }

    /// Creates an API error for a 4xx/5xx status.
    ///
    /// Uses the kind's default message when `message` is `None`. Returns a
    /// transport error for statuses outside 4xx/5xx, since no HTTP kind
    /// applies to them.
    pub fn from_status(status_code: u16, message: Option<String>) -> Self {
        match ErrorKind::from_status(status_code) {
            Some(kind) => NylasError::Api {
                kind,
                status_code,
                message: message.unwrap_or_else(|| kind.default_message().to_string()),
                request_id: None,
                retry_after: None,
            },
            None => NylasError::Transport {
                message: message
                    .unwrap_or_else(|| format!("Unexpected HTTP status {status_code}")),
                status_code: Some(status_code),
            },
        }
    }
}

impl From<TransportError> for NylasError {
    fn from(err: TransportError) -> Self {
        NylasError::Transport {
            message: err.to_string(),
            status_code: None,
        }
    }
}

impl From<serde_json::Error> for NylasError {
    fn from(err: serde_json::Error) -> Self {
        NylasError::Serialization {
            message: err.to_string(),
            status_code: None,
        }
    }
}

impl From<url::ParseError> for NylasError {
    fn from(err: url::ParseError) -> Self {
        NylasError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
