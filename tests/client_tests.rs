//! Integration tests for the client against scripted transports.

use async_trait::async_trait;
use nylas_client::mocks::{fixtures, MockResponse, MockTransport};
use nylas_client::observability::LoggingConfig;
use nylas_client::{
    ApiRequest, AuthScope, ErrorKind, HttpTransport, NylasClient, NylasOptions, RequestDescriptor,
    ResponseEnvelope, TransportError,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use test_case::test_case;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Deserialize, PartialEq)]
struct Account {
    id: String,
    email_address: String,
    provider: String,
}

fn client(transport: Arc<MockTransport>) -> NylasClient {
    NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("token_12345")
        .transport(transport)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_decodes_success_body() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&fixtures::account());
    let client = client(Arc::clone(&transport));

    // Act
    let account: Account = client.get("/account").await.unwrap();

    // Assert
    assert_eq!(
        account,
        Account {
            id: "awa6ltos76vz5hvphkp8k17nt".to_string(),
            email_address: "benbitdiddle@gmail.com".to_string(),
            provider: "gmail".to_string(),
        }
    );
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Event {
    id: String,
    title: String,
    busy: bool,
    participants: Vec<String>,
    metadata: BTreeMap<String, String>,
    when: Option<i64>,
}

fn event(id: &str, participants: &[&str], when: Option<i64>) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {} \u{2603} \"quoted\"", id),
        busy: participants.len() > 1,
        participants: participants.iter().map(|p| p.to_string()).collect(),
        metadata: participants
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("k{}", i), p.to_string()))
            .collect(),
        when,
    }
}

#[test_case(event("evt_1", &[], None) ; "no participants")]
#[test_case(event("evt_2", &["ada@example.com"], Some(1_700_000_000)) ; "single participant")]
#[test_case(event("evt_3", &["a@b.c", "d@e.f", "g@h.i"], Some(-1)) ; "several participants")]
fn test_success_body_decodes_to_encoded_value(expected: Event) {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    let body = serde_json::to_vec(&expected).unwrap();
    transport.queue(MockResponse::new(200, body).with_header("content-type", "application/json"));
    let client = client(Arc::clone(&transport));

    // Act
    let decoded: Event = tokio_test::block_on(client.get("/events/evt")).unwrap();

    // Assert
    assert_eq!(decoded, expected);
}

#[test]
fn test_blank_credentials_fail_before_any_request() {
    // Arrange
    let transport = Arc::new(MockTransport::new());

    // Act
    let result = NylasClient::builder()
        .client_id("client-id")
        .client_secret("   ")
        .access_token("  ")
        .transport(transport.clone())
        .build();

    // Assert
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_whitespace_access_token_is_never_sent() {
    // Arrange
    let transport = Arc::new(MockTransport::new());

    // Act
    let result = NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("  ")
        .transport(transport.clone())
        .build();

    // Assert
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    assert!(transport.last_request().is_none());
}

#[tokio::test]
async fn test_malformed_success_body_is_serialization_error() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.queue(MockResponse::new(200, "{\"id\": 12").with_header("content-type", "application/json"));
    let client = client(Arc::clone(&transport));

    // Act
    let error = client.get::<Account>("/account").await.unwrap_err();

    // Assert
    assert_eq!(error.kind(), ErrorKind::Serialization);
    assert_eq!(error.status_code(), Some(200));
}

#[tokio::test]
async fn test_wrong_shape_is_serialization_error() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&fixtures::threads());
    let client = client(Arc::clone(&transport));

    // Act
    let error = client.get::<Account>("/account").await.unwrap_err();

    // Assert
    assert_eq!(error.kind(), ErrorKind::Serialization);
}

#[tokio::test]
async fn test_unknown_region_fails_before_any_request() {
    // Arrange
    let transport = Arc::new(MockTransport::new());

    // Act
    let result = NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("token")
        .region("mars")
        .transport(transport.clone())
        .build();

    // Assert
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(error.message().contains("mars"));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_region_selects_host() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.set_default(MockResponse::json(&fixtures::threads()));
    let client = NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("token")
        .region("ireland")
        .transport(transport.clone())
        .build()
        .unwrap();

    // Act
    let _: serde_json::Value = client
        .execute(ApiRequest::get("/threads").query("limit", 5).query("in", "inbox"))
        .await
        .unwrap();

    // Assert
    let request = transport.last_request().unwrap();
    assert_eq!(
        request.url,
        "https://ireland.api.nylas.com/threads?limit=5&in=inbox"
    );
}

#[tokio::test]
async fn test_application_scope_uses_client_secret() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&serde_json::json!([]));
    let client = client(Arc::clone(&transport));

    // Act
    let _: serde_json::Value = client
        .execute(ApiRequest::get("/a/client-id/accounts").scope(AuthScope::Application))
        .await
        .unwrap();

    // Assert
    let request = transport.last_request().unwrap();
    // base64("client-secret:")
    assert_eq!(
        request.header("Authorization"),
        Some("Basic Y2xpZW50LXNlY3JldDo=")
    );
}

#[tokio::test]
async fn test_form_body_for_unauthenticated_endpoint() {
    // Arrange
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&serde_json::json!({"access_token": "new-token"}));
    let client = client(Arc::clone(&transport));

    // Act
    let _: serde_json::Value = client
        .execute(
            ApiRequest::post("/oauth/token")
                .scope(AuthScope::None)
                .form([("grant_type", "authorization_code"), ("code", "abc")]),
        )
        .await
        .unwrap();

    // Assert
    let request = transport.last_request().unwrap();
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(
        request.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        request.body_text().as_deref(),
        Some("grant_type=authorization_code&code=abc")
    );
}

#[tokio::test]
async fn test_client_from_options() {
    // Arrange
    let options: NylasOptions = serde_json::from_value(serde_json::json!({
        "client_id": "client-id",
        "client_secret": "client-secret",
        "access_token": "token",
        "region": "ireland",
        "debug": true
    }))
    .unwrap();

    // Act
    let client = NylasClient::from_options(options).unwrap();

    // Assert
    assert_eq!(client.config().base_url(), "https://ireland.api.nylas.com");
    assert!(client.config().debug());
}

/// Answers every request with the URL it was sent to.
struct EchoTransport;

#[async_trait]
impl HttpTransport for EchoTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseEnvelope, TransportError> {
        tokio::task::yield_now().await;
        let body = serde_json::to_vec(&serde_json::json!({ "url": request.url }))
            .map_err(|e| TransportError::InvalidResponse {
                message: e.to_string(),
            })?;
        Ok(ResponseEnvelope::new(200, body))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_cross_talk() {
    // Arrange
    let client = NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("token")
        .transport(Arc::new(EchoTransport))
        .build()
        .unwrap();

    // Act
    let calls = (0..32).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            let path = format!("/messages/msg_{}", i);
            let echoed: serde_json::Value = client.get(&path).await.unwrap();
            (path, echoed)
        })
    });
    let results = futures::future::join_all(calls).await;

    // Assert
    for result in results {
        let (path, echoed) = result.unwrap();
        assert_eq!(echoed["url"], format!("https://api.nylas.com{}", path));
    }
}

#[test]
fn test_debug_log_file_redacts_credentials() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("nylas.log");
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&serde_json::json!({"access_token": "issued-secret"}));
    let client = NylasClient::builder()
        .client_id("client-id")
        .client_secret("client-secret")
        .access_token("token_12345")
        .debug(true)
        .log_file(&log_path)
        .transport(transport)
        .build()
        .unwrap();
    let subscriber = LoggingConfig::from_config(client.config())
        .with_level(LevelFilter::DEBUG)
        .build()
        .unwrap();

    // Act
    tracing::subscriber::with_default(subscriber, || {
        let _: serde_json::Value = tokio_test::block_on(client.get("/account")).unwrap();
    });

    // Assert
    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains("Outgoing request"));
    assert!(logged.contains("Incoming response"));
    assert!(!logged.contains("token_12345"));
    assert!(!logged.contains("issued-secret"));
}
