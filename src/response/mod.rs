//! Response mapping.
//!
//! Turns a [`ResponseEnvelope`] into a decoded value or a [`NylasError`].
//! Mapping is stateless: the result depends only on the envelope.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{ErrorKind, NylasError, NylasResult};
use crate::transport::ResponseEnvelope;

/// Error body returned by the API.
///
/// Older endpoints put `message` at the top level; newer ones nest it under
/// `error`. OAuth endpoints send `error` as a bare code with an
/// `error_description`. Fields are read independently, so one field of an
/// unexpected type does not hide the others.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApiErrorBody {
    /// Top-level error message.
    pub message: Option<String>,
    /// Top-level error type.
    pub error_type: Option<String>,
    /// Request ID echoed in the body.
    pub request_id: Option<String>,
    /// Nested error details.
    pub error: Option<ApiErrorDetail>,
}

/// Nested error details.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApiErrorDetail {
    /// The error message.
    pub message: Option<String>,
    /// The error type.
    pub error_type: Option<String>,
}

fn text_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

impl ApiErrorBody {
    /// Parses an error body, returning an empty one if it is not a JSON object.
    pub fn parse(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let error = match fields.get("error") {
            Some(Value::Object(detail)) => Some(ApiErrorDetail {
                message: text_field(detail.get("message")),
                error_type: text_field(detail.get("type")),
            }),
            Some(Value::String(code)) => Some(ApiErrorDetail {
                message: text_field(fields.get("error_description")),
                error_type: Some(code.clone()),
            }),
            _ => None,
        };

        Self {
            message: text_field(fields.get("message")),
            error_type: text_field(fields.get("type")),
            request_id: text_field(fields.get("request_id")),
            error,
        }
    }

    /// Returns the most specific non-blank message.
    pub fn message(&self) -> Option<&str> {
        let nested = self.error.as_ref().and_then(|e| e.message.as_deref());
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| nested.filter(|m| !m.trim().is_empty()))
    }

    /// Returns the error type, if any.
    pub fn error_type(&self) -> Option<&str> {
        self.error_type
            .as_deref()
            .or_else(|| self.error.as_ref().and_then(|e| e.error_type.as_deref()))
    }
}

/// Decodes a successful response body as `T`.
///
/// Non-2xx responses are mapped through [`map_error`]. A 2xx body that does
/// not decode is a serialization error, never a partial value.
pub fn map_json<T: DeserializeOwned>(response: ResponseEnvelope) -> NylasResult<T> {
    if !response.is_success() {
        return Err(map_error(&response));
    }

    serde_json::from_slice(&response.body).map_err(|e| NylasError::Serialization {
        message: format!("Failed to decode response body: {}", e),
        status_code: Some(response.status),
    })
}

/// Accepts any 2xx response and discards its body.
pub fn map_empty(response: ResponseEnvelope) -> NylasResult<()> {
    if !response.is_success() {
        return Err(map_error(&response));
    }
    Ok(())
}

/// Returns the raw body of a 2xx response.
pub fn map_bytes(response: ResponseEnvelope) -> NylasResult<Bytes> {
    if !response.is_success() {
        return Err(map_error(&response));
    }
    Ok(response.body)
}

/// Builds the error for a non-2xx response.
pub fn map_error(response: &ResponseEnvelope) -> NylasError {
    let body = ApiErrorBody::parse(&response.body);
    let message = body.message().map(str::to_string);

    let Some(kind) = ErrorKind::from_status(response.status) else {
        return NylasError::from_status(response.status, message);
    };

    let request_id = response
        .header("x-request-id")
        .map(str::to_string)
        .or_else(|| body.request_id.clone());

    let retry_after = if kind == ErrorKind::RateLimited {
        response.header("retry-after").and_then(parse_retry_after)
    } else {
        None
    };

    tracing::warn!(
        status = response.status,
        kind = %kind,
        error_type = body.error_type().unwrap_or("unknown"),
        request_id = request_id.as_deref().unwrap_or(""),
        "API error response"
    );

    NylasError::Api {
        kind,
        status_code: response.status,
        message: message.unwrap_or_else(|| kind.default_message().to_string()),
        request_id,
        retry_after,
    }
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
