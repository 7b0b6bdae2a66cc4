//! Nylas Client Library
//!
//! The shared core of a Nylas API client: region-aware configuration,
//! credential handling, request building, a replaceable HTTP transport, and
//! mapping of responses to typed values or a closed error taxonomy.
//! Endpoint-specific operations are built on top of [`NylasClient::execute`].
//!
//! # Features
//!
//! - **Regions**: `oregon` (default) and `ireland`, or an explicit base URL
//! - **Credentials**: bearer access token for account endpoints, basic client
//!   secret for application endpoints
//! - **Errors**: every failure is a [`NylasError`] with an [`ErrorKind`],
//!   the HTTP status, and the server's message where one was given
//! - **Transport**: reqwest by default, swappable at runtime for tests
//! - **Observability**: `tracing` events with credentials redacted, optional
//!   JSON log file
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nylas_client::{ApiRequest, AuthScope, NylasClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NylasClient::builder()
//!         .client_id("your-client-id")
//!         .client_secret("your-client-secret")
//!         .access_token("account-access-token")
//!         .region("ireland")
//!         .build()?;
//!
//!     let account: serde_json::Value = client.get("/account").await?;
//!     println!("{}", account["email_address"]);
//!
//!     let accounts: serde_json::Value = client
//!         .execute(
//!             ApiRequest::get("/a/your-client-id/accounts")
//!                 .scope(AuthScope::Application)
//!                 .query("limit", 10),
//!         )
//!         .await?;
//!     println!("{}", accounts);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! With the `mocks` feature, [`mocks::MockTransport`] answers requests from a
//! queue of canned responses:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nylas_client::mocks::MockTransport;
//! use nylas_client::{ErrorKind, NylasClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mock = Arc::new(MockTransport::new());
//! mock.queue_status(405, &[], "{}");
//!
//! let client = NylasClient::builder()
//!     .client_id("id")
//!     .client_secret("secret")
//!     .access_token("token")
//!     .transport(mock.clone())
//!     .build()?;
//!
//! let err = client.get::<serde_json::Value>("/account").await.unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MethodNotAllowed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod request;
pub mod response;
pub mod transport;

// Re-exports for convenience
pub use auth::AuthScope;
pub use client::{NylasClient, NylasClientBuilder};
pub use config::{NylasConfig, NylasConfigBuilder, NylasOptions, Region};
pub use errors::{ErrorKind, NylasError, NylasResult};
pub use request::{ApiRequest, RequestBody};
pub use transport::{
    HttpMethod, HttpTransport, RequestDescriptor, ResponseEnvelope, ReqwestTransport,
    TransportError,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
