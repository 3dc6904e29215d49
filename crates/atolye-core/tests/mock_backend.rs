//! Mock backend tests for the atolye client.
//!
//! These tests use wiremock to simulate the repair-service API and exercise
//! the gateway and the typed client without network access or real
//! credentials.

use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atolye_core::models::{NewCustomer, NewOperation, RepairStatus, RepairUpdate};
use atolye_core::{ApiClient, ApiError, Gateway, RequestOptions, TokenProvider, UnauthorizedPolicy};

/// Credential provider with a settable token, so tests can observe whether
/// the gateway dropped it.
struct FakeProvider {
    token: Mutex<Option<String>>,
}

impl FakeProvider {
    fn with_token(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(token.to_string())),
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(None),
        })
    }

    fn current(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl TokenProvider for FakeProvider {
    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn invalidate(&self) {
        *self.token.lock().unwrap() = None;
    }
}

fn client_for(server: &MockServer, provider: Arc<FakeProvider>) -> ApiClient {
    ApiClient::new(server.uri(), provider).unwrap()
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/Login"))
        .and(body_json(json!({
            "username": "usta",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-abc"})))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::empty());
    let session = client.login("usta", "secret123").await.unwrap();

    assert_eq!(session.token, "jwt-abc");
    assert_eq!(session.username, "usta");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/Login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Kullanıcı adı/şifre hatalı"))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::empty());
    let err = client.login("usta", "wrong").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_login_never_sends_stale_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-new"})))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("jwt-stale"));
    client.login("usta", "secret123").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

// ============================================================================
// Gateway Header Tests
// ============================================================================

#[tokio::test]
async fn test_request_without_token_has_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::empty());
    let customers = client.fetch_customers().await.unwrap();
    assert!(customers.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("content-type").unwrap().to_str().unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_stored_token_and_body_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(header("authorization", "Bearer abc123"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Ada", "email": null, "phone": null})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Ada"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    let created = client
        .create_customer(&NewCustomer {
            name: "Ada".to_string(),
            email: None,
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn test_stored_token_overrides_caller_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let gateway = Gateway::new(reqwest::Client::new(), FakeProvider::with_token("abc123"));
    let mut options = RequestOptions::default();
    options.headers.insert(
        reqwest::header::AUTHORIZATION,
        reqwest::header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let url = format!("{}/api/customers", server.uri());
    let response = gateway.send(&url, options).await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_caller_content_type_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let gateway = Gateway::new(reqwest::Client::new(), FakeProvider::empty());
    let mut options = RequestOptions::method(reqwest::Method::POST).with_body("merhaba".to_string());
    options.headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("text/plain"),
    );

    let url = format!("{}/upload", server.uri());
    let response = gateway.send(&url, options).await.unwrap();
    assert!(response.status().is_success());
}

// ============================================================================
// Status Handling Tests
// ============================================================================

#[tokio::test]
async fn test_gateway_returns_error_statuses_as_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Repairs/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Kayıt bulunamadı"))
        .mount(&server)
        .await;

    let gateway = Gateway::new(reqwest::Client::new(), FakeProvider::empty());
    let url = format!("{}/api/Repairs/99", server.uri());
    let response = gateway.send(&url, RequestOptions::default()).await.unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.unwrap(), "Kayıt bulunamadı");
}

#[tokio::test]
async fn test_client_maps_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Repairs/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Kayıt bulunamadı"))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::empty());
    let err = client.fetch_repair(99).await.unwrap_err();

    match err.downcast_ref::<ApiError>() {
        Some(ApiError::NotFound(body)) => assert!(body.contains("bulunamadı")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_keeps_credential_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = FakeProvider::with_token("jwt-stale");
    let client = client_for(&server, provider.clone());
    let err = client.fetch_customers().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Unauthorized)
    ));
    // Un-hardened default: the rejected credential stays in storage
    assert_eq!(provider.current().as_deref(), Some("jwt-stale"));
}

#[tokio::test]
async fn test_unauthorized_invalidate_policy_drops_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = FakeProvider::with_token("jwt-stale");
    let client = client_for(&server, provider.clone())
        .with_unauthorized_policy(UnauthorizedPolicy::InvalidateSession);
    let _ = client.fetch_customers().await;

    assert_eq!(provider.current(), None);
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    // Nothing listens on port 9 in the test environment
    let client = ApiClient::new("http://127.0.0.1:9", FakeProvider::empty()).unwrap();
    let err = client.fetch_customers().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::NetworkError(_))
    ));
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_machines_for_customer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/machines"))
        .and(query_param("customerId", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "serialNumber": "SN-001", "model": "X200", "customerId": 4}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    let machines = client.fetch_machines(Some(4)).await.unwrap();

    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].display_label(), "X200 - SN-001");
}

#[tokio::test]
async fn test_fetch_repair_with_nested_machine() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Repairs/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "repairDate": "2025-01-05T13:45:00",
            "issueDescription": "Motor ısınıyor",
            "status": "İşlendi",
            "priceOffer": 0.0,
            "machine": {
                "serialNumber": "SN-001",
                "model": "X200",
                "customer": {"name": "Ada Usta", "email": "ada@example.com", "phone": "555-0101"}
            },
            "operations": [
                {"id": 1, "name": "Motor bakım", "price": 250.0, "currency": "TRY"}
            ],
            "spareParts": [
                {"id": 2, "partName": "Rulman", "price": 120.0, "currency": "TRY"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    let repair = client.fetch_repair(3).await.unwrap();

    assert_eq!(repair.status(), Some(RepairStatus::Processed));
    assert_eq!(repair.quote_total(), 370.0);
    let machine = repair.machine.expect("machine missing");
    assert_eq!(machine.customer.expect("customer missing").name, "Ada Usta");
}

#[tokio::test]
async fn test_update_repair_sends_only_set_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/Repairs/5"))
        .and(body_json(json!({"status": "Gönderildi"})))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    client
        .update_repair(5, &RepairUpdate::status(RepairStatus::Sent))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_repair_operations_sends_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Repairs/7/operations"))
        .and(body_json(json!([
            {"name": "Motor bakım", "description": null, "price": 250.0, "currency": "TRY"}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    client
        .add_repair_operations(
            7,
            &[NewOperation {
                name: "Motor bakım".to_string(),
                description: None,
                price: 250.0,
                currency: "TRY".to_string(),
            }],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generate_qr_encodes_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Repairs/qr"))
        .and(query_param("text", "https://atolye.example/repairs/7/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qrCode": "data:image/png;base64,AAAA"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    let qr = client
        .generate_qr("https://atolye.example/repairs/7/report")
        .await
        .unwrap();

    assert_eq!(qr, "data:image/png;base64,AAAA");
}

#[tokio::test]
async fn test_attach_qr_code_stores_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Repairs/qr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qrCode": "data:image/png;base64,AAAA"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/Repairs/7"))
        .and(body_json(json!({"qrCode": "data:image/png;base64,AAAA"})))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, FakeProvider::with_token("abc123"));
    let qr = client
        .attach_qr_code(7, "https://atolye.example/repairs/7/report")
        .await
        .unwrap();

    assert_eq!(qr, "data:image/png;base64,AAAA");
}
