//! Authentication module for the Nylas client.
//!
//! The API has two credential scopes: account endpoints take the account's
//! access token as a bearer token, application endpoints take the client
//! secret as the HTTP basic username with an empty password.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::config::secret_hint;
use crate::errors::NylasError;

/// Which credential a request is signed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScope {
    /// Account-level endpoints, signed with the access token.
    #[default]
    Account,
    /// Application-level endpoints, signed with the client secret.
    Application,
    /// Unauthenticated endpoints (OAuth token exchange and similar).
    None,
}

/// Authentication provider trait.
///
/// Implementations of this trait provide authentication credentials
/// for API requests.
pub trait AuthProvider: Send + Sync + std::fmt::Debug {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Get the authentication scheme name.
    fn scheme(&self) -> &str;

    /// Validate the credentials.
    fn validate(&self) -> Result<(), NylasError>;
}

/// Bearer authentication with an account access token.
pub struct AccessTokenAuth {
    token: SecretString,
}

impl AccessTokenAuth {
    /// Creates a new access token provider.
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Creates from a string token.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self::new(SecretString::new(token.into()))
    }

    /// Gets a hint of the token for debugging (last 4 characters).
    pub fn token_hint(&self) -> String {
        secret_hint(self.token.expose_secret())
    }
}

impl AuthProvider for AccessTokenAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.token.expose_secret()),
        );
    }

    fn scheme(&self) -> &str {
        "Bearer"
    }

    fn validate(&self) -> Result<(), NylasError> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(NylasError::configuration("access token cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AccessTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenAuth")
            .field("token", &"[REDACTED]")
            .field("token_hint", &self.token_hint())
            .finish()
    }
}

/// Basic authentication with the application client secret.
pub struct ClientSecretAuth {
    secret: SecretString,
}

impl ClientSecretAuth {
    /// Creates a new client secret provider.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Creates from a string secret.
    pub fn from_string(secret: impl Into<String>) -> Self {
        Self::new(SecretString::new(secret.into()))
    }
}

impl AuthProvider for ClientSecretAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        let encoded = STANDARD.encode(format!("{}:", self.secret.expose_secret()));
        headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
    }

    fn scheme(&self) -> &str {
        "Basic"
    }

    fn validate(&self) -> Result<(), NylasError> {
        if self.secret.expose_secret().trim().is_empty() {
            return Err(NylasError::configuration("client secret cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientSecretAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretAuth")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
