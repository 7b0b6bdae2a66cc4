//! Observability module for the Nylas client.
//!
//! Logging goes through `tracing`. [`LoggingConfig`] installs a subscriber
//! honouring the client's debug flag and log file; the helpers below emit the
//! per-request events, with credentials redacted.

mod logging;

pub use logging::{LogFormat, LoggingConfig};

use regex::Regex;
use std::sync::OnceLock;

use crate::transport::{RequestDescriptor, ResponseEnvelope};

/// Maximum number of body characters written to the log.
pub const MAX_LOGGED_BODY: usize = 1024;

fn redaction_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"Bearer\s+[^\s,;]+", "Bearer ***"),
            (r"Basic\s+[A-Za-z0-9+/=]+", "Basic ***"),
            (
                r#""(access_token|client_secret|refresh_token|password)"\s*:\s*"[^"]*""#,
                r#""$1":"***""#,
            ),
            (
                r"(access_token|client_secret|refresh_token|code)=[^&\s]+",
                "$1=***",
            ),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
    })
}

/// Masks credentials in text destined for the log.
pub fn redact(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in redaction_patterns() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    result
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => format!("{}... [truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

fn loggable_body(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    truncate(&redact(&String::from_utf8_lossy(body)))
}

/// Logs an outgoing request. Bodies are only logged when `debug` is set.
pub fn log_request(request: &RequestDescriptor, debug: bool) {
    if debug {
        let headers: Vec<String> = request
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, redact(v)))
            .collect();
        let body = match request.body.as_deref() {
            Some(body) => loggable_body(body),
            None => "<empty>".to_string(),
        };
        tracing::debug!(
            method = %request.method,
            url = %redact(&request.url),
            headers = ?headers,
            body = %body,
            "Outgoing request"
        );
    } else {
        tracing::debug!(method = %request.method, url = %redact(&request.url), "Outgoing request");
    }
}

/// Logs an incoming response. Bodies are only logged when `debug` is set.
pub fn log_response(response: &ResponseEnvelope, debug: bool) {
    if debug {
        tracing::debug!(
            status = response.status,
            body = %loggable_body(&response.body),
            "Incoming response"
        );
    } else {
        tracing::debug!(status = response.status, bytes = response.body.len(), "Incoming response");
    }
}
