//! Request description and building.
//!
//! Endpoint code describes a call with [`ApiRequest`]; [`RequestBuilder`]
//! resolves it against a [`NylasConfig`] into the [`RequestDescriptor`] a
//! transport sends. Building is a pure function of the request and the
//! configuration.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::auth::AuthScope;
use crate::config::NylasConfig;
use crate::errors::{NylasError, NylasResult};
use crate::transport::{HttpMethod, RequestDescriptor};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("nylas-client-rust/", env!("CARGO_PKG_VERSION"));

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured data, sent as `application/json`.
    Json(serde_json::Value),
    /// Form fields, sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Pre-encoded bytes with an explicit content type (raw MIME, uploads).
    Raw {
        /// Content type of `data`.
        content_type: String,
        /// Body bytes.
        data: Bytes,
    },
}

/// Inbound call shape used by endpoint code.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the API base URL.
    pub path: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Extra headers; these override any header the builder would set.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Credential used to sign the request.
    pub scope: AuthScope,
    /// Timeout override for this call.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Creates an account-scoped request without query, headers, or body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            scope: AuthScope::Account,
            timeout: None,
        }
    }

    /// Creates a new GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a new POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a new PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a new PATCH request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a new DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Appends several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> NylasResult<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Sets an already-built JSON payload.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Sets form fields as the payload.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Sets raw bytes with an explicit content type as the payload.
    pub fn raw(mut self, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    /// Sets the credential scope.
    pub fn scope(mut self, scope: AuthScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Resolves [`ApiRequest`]s against a configuration.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a NylasConfig,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder bound to `config`.
    pub fn new(config: &'a NylasConfig) -> Self {
        Self { config }
    }

    /// Builds the descriptor for `request`.
    ///
    /// Fails with a configuration error when the URL cannot be formed or the
    /// request's scope needs a credential that is not configured.
    pub fn build(&self, request: &ApiRequest) -> NylasResult<RequestDescriptor> {
        let url = self.resolve_url(&request.path, &request.query)?;

        let mut headers = HashMap::new();
        set_header(&mut headers, "Accept", mime::APPLICATION_JSON.as_ref());
        set_header(&mut headers, "User-Agent", USER_AGENT);

        for (name, value) in self.config.custom_headers() {
            set_header(&mut headers, name, value);
        }

        if let Some(auth) = self.config.auth_for(request.scope)? {
            headers.retain(|k, _| !k.eq_ignore_ascii_case("Authorization"));
            auth.apply_auth(&mut headers);
        }

        let body = match &request.body {
            Some(body) => {
                let (content_type, bytes) = encode_body(body)?;
                set_header(&mut headers, "Content-Type", &content_type);
                Some(bytes)
            }
            None => None,
        };

        for (name, value) in &request.headers {
            set_header(&mut headers, name, value);
        }

        Ok(RequestDescriptor {
            method: request.method,
            url,
            headers,
            body,
            timeout: request.timeout,
        })
    }

    fn resolve_url(&self, path: &str, query: &[(String, String)]) -> NylasResult<String> {
        let raw = format!(
            "{}/{}",
            self.config.base_url(),
            path.trim_start_matches('/')
        );
        let mut url = url::Url::parse(&raw)?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url.into())
    }
}

fn encode_body(body: &RequestBody) -> NylasResult<(String, Bytes)> {
    match body {
        RequestBody::Json(value) => Ok((
            mime::APPLICATION_JSON.to_string(),
            Bytes::from(serde_json::to_vec(value)?),
        )),
        RequestBody::Form(fields) => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields)
                .finish();
            Ok((
                mime::APPLICATION_WWW_FORM_URLENCODED.to_string(),
                Bytes::from(encoded),
            ))
        }
        RequestBody::Raw { content_type, data } => {
            if content_type.parse::<mime::Mime>().is_err() {
                return Err(NylasError::Serialization {
                    message: format!("Invalid content type '{}'", content_type),
                    status_code: None,
                });
            }
            Ok((content_type.clone(), data.clone()))
        }
    }
}

/// Inserts a header, replacing any existing one with the same name in any case.
fn set_header(headers: &mut HashMap<String, String>, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}
