//! Nylas API client.
//!
//! [`NylasClient`] is the single entry point endpoint code calls: it builds
//! the request from the shared configuration, sends it through the current
//! transport, and maps the response.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::config::{NylasConfig, NylasConfigBuilder, NylasOptions};
use crate::errors::NylasResult;
use crate::observability::{self, LoggingConfig};
use crate::request::{ApiRequest, RequestBuilder};
use crate::response;
use crate::transport::{HttpTransport, ResponseEnvelope};

/// The main Nylas client.
///
/// Cheap to clone; clones share one configuration and transport.
///
/// # Example
///
/// ```rust,no_run
/// use nylas_client::{ApiRequest, NylasClient, Region};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = NylasClient::builder()
///         .client_id("client-id")
///         .client_secret("client-secret")
///         .access_token("access-token")
///         .region(Region::Ireland)
///         .build()?;
///
///     let account: serde_json::Value = client.get("/account").await?;
///     println!("{}", account["email_address"]);
///
///     let threads: serde_json::Value = client
///         .execute(ApiRequest::get("/threads").query("limit", 5))
///         .await?;
///     println!("{}", threads);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct NylasClient {
    config: Arc<NylasConfig>,
}

impl NylasClient {
    /// Creates a new client builder.
    pub fn builder() -> NylasClientBuilder {
        NylasClientBuilder::new()
    }

    /// Creates a client from an existing configuration.
    pub fn from_config(config: NylasConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a client from named options.
    pub fn from_options(options: NylasOptions) -> NylasResult<Self> {
        Ok(Self::from_config(NylasConfig::from_options(options)?))
    }

    /// Creates a client from environment variables.
    ///
    /// See [`NylasConfig::from_env`] for the variables read.
    pub fn from_env() -> NylasResult<Self> {
        Ok(Self::from_config(NylasConfig::from_env()?))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NylasConfig {
        &self.config
    }

    /// Replaces the transport and returns the previous one.
    ///
    /// See [`NylasConfig::set_transport`].
    pub fn set_transport(&self, transport: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport> {
        self.config.set_transport(transport)
    }

    /// Installs a global `tracing` subscriber derived from the configuration.
    ///
    /// Debug mode logs at `DEBUG`; a configured log file receives JSON lines.
    pub fn init_logging(&self) -> NylasResult<()> {
        LoggingConfig::from_config(&self.config).init()
    }

    /// Executes a request and decodes the JSON response as `T`.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> NylasResult<T> {
        let response = self.dispatch(&request).await?;
        response::map_json(response)
    }

    /// Executes a request whose response carries no payload.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute_empty(&self, request: ApiRequest) -> NylasResult<()> {
        let response = self.dispatch(&request).await?;
        response::map_empty(response)
    }

    /// Executes a request and returns the raw response body.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute_bytes(&self, request: ApiRequest) -> NylasResult<Bytes> {
        let response = self.dispatch(&request).await?;
        response::map_bytes(response)
    }

    /// Sends an account-scoped GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> NylasResult<T> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Sends an account-scoped POST request with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> NylasResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    /// Sends an account-scoped PUT request with a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> NylasResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    /// Sends an account-scoped DELETE request, ignoring any response body.
    pub async fn delete(&self, path: &str) -> NylasResult<()> {
        self.execute_empty(ApiRequest::delete(path)).await
    }

    async fn dispatch(&self, request: &ApiRequest) -> NylasResult<ResponseEnvelope> {
        let descriptor = RequestBuilder::new(&self.config).build(request)?;
        let debug = self.config.debug();
        observability::log_request(&descriptor, debug);

        let transport = self.config.transport();
        let response = transport.send(descriptor).await.map_err(|e| {
            tracing::warn!(transport = transport.name(), error = %e, "Transport failure");
            e
        })?;

        observability::log_response(&response, debug);
        Ok(response)
    }
}

impl std::fmt::Debug for NylasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NylasClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the Nylas client.
#[derive(Default)]
pub struct NylasClientBuilder {
    config_builder: NylasConfigBuilder,
}

impl NylasClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled from named options.
    pub fn from_options(options: NylasOptions) -> Self {
        Self {
            config_builder: NylasConfigBuilder::from_options(options),
        }
    }

    /// Sets the application client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.client_id(client_id);
        self
    }

    /// Sets the application client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.client_secret(client_secret);
        self
    }

    /// Sets the account access token.
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.access_token(access_token);
        self
    }

    /// Sets the region by value or by name.
    pub fn region(mut self, region: impl AsRef<str>) -> Self {
        self.config_builder = self.config_builder.region(region);
        self
    }

    /// Enables body logging.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config_builder = self.config_builder.debug(debug);
        self
    }

    /// Sets the log destination.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.log_file(path);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Overrides the region's base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.config_builder = self.config_builder.transport(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> NylasResult<NylasClient> {
        let config = self.config_builder.build()?;
        tracing::debug!(
            region = %config.region(),
            base_url = config.base_url(),
            transport = config.transport().name(),
            "Nylas client created"
        );
        Ok(NylasClient::from_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::mocks::{MockResponse, MockTransport};

    fn client(transport: Arc<MockTransport>) -> NylasClient {
        NylasClient::builder()
            .client_id("client-id")
            .client_secret("client-secret")
            .access_token("token_12345")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = NylasClientBuilder::new().build();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_builder_rejects_unknown_region() {
        let result = NylasClient::builder()
            .client_id("id")
            .client_secret("secret")
            .region("antarctica")
            .build();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_json(&serde_json::json!({"id": "acc_1", "email_address": "a@b.c"}));
        let client = client(Arc::clone(&transport));

        let account: serde_json::Value = client.get("/account").await.unwrap();

        assert_eq!(account["id"], "acc_1");
        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://api.nylas.com/account");
        assert_eq!(request.header("Authorization"), Some("Bearer token_12345"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_json(&serde_json::json!({"id": "evt_1"}));
        let client = client(Arc::clone(&transport));

        let _: serde_json::Value = client
            .post("/events", &serde_json::json!({"title": "Standup"}))
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body_json().unwrap(),
            serde_json::json!({"title": "Standup"})
        );
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::empty(204));
        let client = client(Arc::clone(&transport));

        client.delete("/events/evt_1").await.unwrap();

        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_bytes_returns_raw_body() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::bytes(200, "application/octet-stream", b"\x00\x01".to_vec()));
        let client = client(Arc::clone(&transport));

        let body = client
            .execute_bytes(ApiRequest::get("/files/f1/download"))
            .await
            .unwrap();

        assert_eq!(body.as_ref(), b"\x00\x01");
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let transport = Arc::new(MockTransport::new());
        let client = NylasClient::builder()
            .client_id("id")
            .client_secret("secret")
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client.get::<serde_json::Value>("/account").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_wrapped() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_failure("connection refused");
        let client = client(Arc::clone(&transport));

        let err = client.get::<serde_json::Value>("/account").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status_code(), None);
        assert!(err.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_set_transport_redirects_requests() {
        let first = Arc::new(MockTransport::new());
        let second = Arc::new(MockTransport::new());
        second.queue_json(&serde_json::json!({}));
        let client = client(Arc::clone(&first));

        client.set_transport(second.clone());
        let _: serde_json::Value = client.get("/account").await.unwrap();

        assert_eq!(first.request_count(), 0);
        assert_eq!(second.request_count(), 1);
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let client = client(Arc::new(MockTransport::new()));
        let debug = format!("{:?}", client);
        assert!(!debug.contains("token_12345"));
        assert!(debug.contains("mock"));
    }
}
