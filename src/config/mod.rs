//! Configuration module for the Nylas client.
//!
//! Provides configuration management including application credentials, the
//! account access token, region selection, debug logging, and the transport
//! handle used to reach the API.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AccessTokenAuth, AuthProvider, AuthScope, ClientSecretAuth};
use crate::errors::{NylasError, NylasResult};
use crate::transport::{HttpTransport, ReqwestTransport, TransportHandle};

/// Default request timeout (90 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Base URL for the Oregon (US) deployment.
pub const OREGON_BASE_URL: &str = "https://api.nylas.com";

/// Base URL for the Ireland (EU) deployment.
pub const IRELAND_BASE_URL: &str = "https://ireland.api.nylas.com";

/// API deployment region. Only affects the base host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// US deployment (primary).
    #[default]
    Oregon,
    /// EU deployment (secondary).
    Ireland,
}

impl Region {
    /// Returns the base URL of the region's API host.
    pub fn base_url(self) -> &'static str {
        match self {
            Region::Oregon => OREGON_BASE_URL,
            Region::Ireland => IRELAND_BASE_URL,
        }
    }

    /// Returns the region name as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Oregon => "oregon",
            Region::Ireland => "ireland",
        }
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = NylasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oregon" => Ok(Region::Oregon),
            "ireland" => Ok(Region::Ireland),
            other => Err(NylasError::configuration(format!(
                "Unrecognized region '{}' (expected 'oregon' or 'ireland')",
                other
            ))),
        }
    }
}

/// Named client options, as read from a config file or assembled by hand.
///
/// Every field is optional here; [`NylasConfig::from_options`] enforces which
/// ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NylasOptions {
    /// Application client ID.
    pub client_id: Option<String>,
    /// Application client secret.
    pub client_secret: Option<SecretString>,
    /// Account access token.
    pub access_token: Option<SecretString>,
    /// Region name (`oregon` or `ireland`).
    pub region: Option<String>,
    /// Log request and response bodies.
    pub debug: bool,
    /// File that receives log output.
    pub log_file: Option<PathBuf>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Base URL override (mock servers, proxies).
    pub base_url: Option<String>,
}

/// Configuration for the Nylas client.
///
/// Immutable once built, apart from [`NylasConfig::set_transport`].
pub struct NylasConfig {
    client_id: String,
    application_auth: ClientSecretAuth,
    account_auth: Option<AccessTokenAuth>,
    region: Region,
    debug: bool,
    log_file: Option<PathBuf>,
    timeout: Duration,
    base_url: String,
    custom_headers: Vec<(String, String)>,
    transport: TransportHandle,
}

impl NylasConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> NylasConfigBuilder {
        NylasConfigBuilder::new()
    }

    /// Creates a configuration from named options.
    pub fn from_options(options: NylasOptions) -> NylasResult<Self> {
        NylasConfigBuilder::from_options(options).build()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NYLAS_CLIENT_ID` (required): application client ID
    /// - `NYLAS_CLIENT_SECRET` (required): application client secret
    /// - `NYLAS_ACCESS_TOKEN` (optional): account access token
    /// - `NYLAS_REGION` (optional): `oregon` or `ireland`
    /// - `NYLAS_DEBUG` (optional): `true`/`1` to log bodies
    /// - `NYLAS_LOG_FILE` (optional): path that receives log output
    /// - `NYLAS_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> NylasResult<Self> {
        Self::from_options(options_from_vars(|name| std::env::var(name).ok())?)
    }

    /// Returns the application client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns true if an account access token is configured.
    pub fn has_access_token(&self) -> bool {
        self.account_auth.is_some()
    }

    /// Returns the credential that signs requests of the given scope.
    ///
    /// Fails for account-scoped requests when no access token is configured.
    pub fn auth_for(&self, scope: AuthScope) -> NylasResult<Option<&dyn AuthProvider>> {
        match scope {
            AuthScope::Account => match &self.account_auth {
                Some(auth) => Ok(Some(auth as &dyn AuthProvider)),
                None => Err(NylasError::configuration(
                    "an access token is required for account-scoped requests",
                )),
            },
            AuthScope::Application => {
                Ok(Some(&self.application_auth as &dyn AuthProvider))
            }
            AuthScope::None => Ok(None),
        }
    }

    /// Returns the configured region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns true if request and response bodies should be logged.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns the log destination, if any.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns headers attached to every request.
    pub fn custom_headers(&self) -> &[(String, String)] {
        &self.custom_headers
    }

    /// Returns the transport currently in use.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.current()
    }

    /// Replaces the transport and returns the previous one.
    ///
    /// Meant for injecting test doubles. Call it before or between request
    /// sequences, not while requests are in flight.
    pub fn set_transport(&self, transport: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport> {
        tracing::debug!(transport = transport.name(), "Replacing transport");
        self.transport.replace(transport)
    }

    /// Returns the token hint (last 4 characters) for debugging.
    pub fn access_token_hint(&self) -> Option<String> {
        self.account_auth.as_ref().map(AccessTokenAuth::token_hint)
    }
}

impl fmt::Debug for NylasConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NylasConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field(
                "access_token",
                &self.account_auth.as_ref().map(|_| "[REDACTED]"),
            )
            .field("region", &self.region)
            .field("debug", &self.debug)
            .field("log_file", &self.log_file)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Builder for `NylasConfig`.
#[derive(Default)]
pub struct NylasConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    access_token: Option<SecretString>,
    region: Option<String>,
    debug: bool,
    log_file: Option<PathBuf>,
    timeout: Option<Duration>,
    base_url: Option<String>,
    custom_headers: Vec<(String, String)>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl NylasConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled from named options.
    pub fn from_options(options: NylasOptions) -> Self {
        Self {
            client_id: options.client_id,
            client_secret: options.client_secret,
            access_token: options.access_token,
            region: options.region,
            debug: options.debug,
            log_file: options.log_file,
            timeout: options.timeout_secs.map(Duration::from_secs),
            base_url: options.base_url,
            custom_headers: Vec::new(),
            transport: None,
        }
    }

    /// Sets the application client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the application client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Sets the account access token.
    ///
    /// An empty token counts as absent; a whitespace-only one fails `build`.
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(access_token.into()));
        self
    }

    /// Sets the region by value or by name; names are checked in `build`.
    pub fn region(mut self, region: impl AsRef<str>) -> Self {
        self.region = Some(region.as_ref().to_string());
        self
    }

    /// Enables body logging.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the log destination.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Overrides the region's base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> NylasResult<NylasConfig> {
        let client_id = self
            .client_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| NylasError::configuration("client_id is required"))?;

        let application_auth = self
            .client_secret
            .map(ClientSecretAuth::new)
            .ok_or_else(|| NylasError::configuration("client_secret is required"))?;
        application_auth.validate()?;

        let account_auth = self
            .access_token
            .filter(|token| !token.expose_secret().is_empty())
            .map(AccessTokenAuth::new);
        if let Some(auth) = &account_auth {
            auth.validate()?;
        }

        let region = match self.region {
            Some(name) => name.parse::<Region>()?,
            None => Region::default(),
        };

        let base_url = match self.base_url {
            Some(url) => validate_base_url(&url)?,
            None => region.base_url().to_string(),
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(NylasError::configuration("timeout must be greater than zero"));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(timeout).map_err(|e| {
                NylasError::configuration(format!("Failed to create transport: {}", e))
            })?),
        };

        Ok(NylasConfig {
            client_id,
            application_auth,
            account_auth,
            region,
            debug: self.debug,
            log_file: self.log_file,
            timeout,
            base_url,
            custom_headers: self.custom_headers,
            transport: TransportHandle::new(transport),
        })
    }
}

fn validate_base_url(raw: &str) -> NylasResult<String> {
    let parsed = url::Url::parse(raw)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NylasError::configuration(format!(
            "Base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn options_from_vars(lookup: impl Fn(&str) -> Option<String>) -> NylasResult<NylasOptions> {
    let client_id = lookup("NYLAS_CLIENT_ID").ok_or_else(|| {
        NylasError::configuration("NYLAS_CLIENT_ID environment variable not set")
    })?;
    let client_secret = lookup("NYLAS_CLIENT_SECRET").ok_or_else(|| {
        NylasError::configuration("NYLAS_CLIENT_SECRET environment variable not set")
    })?;

    let debug = lookup("NYLAS_DEBUG")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let timeout_secs = match lookup("NYLAS_TIMEOUT") {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            NylasError::configuration(format!("NYLAS_TIMEOUT is not a number: '{}'", raw))
        })?),
        None => None,
    };

    Ok(NylasOptions {
        client_id: Some(client_id),
        client_secret: Some(SecretString::new(client_secret)),
        access_token: lookup("NYLAS_ACCESS_TOKEN").map(SecretString::new),
        region: lookup("NYLAS_REGION"),
        debug,
        log_file: lookup("NYLAS_LOG_FILE").map(PathBuf::from),
        timeout_secs,
        base_url: None,
    })
}

pub(crate) fn secret_hint(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("...{}", tail)
    } else {
        "****".to_string()
    }
}
