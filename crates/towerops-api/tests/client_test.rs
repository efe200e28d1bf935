#![allow(clippy::unwrap_used)]
// Integration tests for `ToweropsClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use towerops_api::{
    DeviceKind, DevicePayload, Error, Field, Sensitive, SitePayload, ToweropsClient,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ToweropsClient) {
    let server = MockServer::start().await;
    let token: SecretString = "test-token".to_string().into();
    let client = ToweropsClient::new(&server.uri(), &token, &TransportConfig::default()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_device_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/device-123"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "device-123",
            "site_id": "site-456",
            "ip_address": "192.168.1.1",
            "name": "Test Device",
            "inserted_at": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = client.get_device("device-123").await.unwrap();

    assert_eq!(device.id, "device-123");
    assert_eq!(device.site_id, Field::Value("site-456".into()));
    assert_eq!(device.ip_address, "192.168.1.1");
    assert_eq!(device.name, Field::Value("Test Device".into()));
    assert!(device.description.is_absent());
}

#[tokio::test]
async fn test_create_device_wraps_payload_in_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/devices"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "device": {
                "site_id": "site-456",
                "ip_address": "192.168.1.100",
                "snmp_port": 161,
                "description": null
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-device-id",
            "site_id": "site-456",
            "ip_address": "192.168.1.100",
            "name": "New Device",
            "monitoring_enabled": true,
            "snmp_enabled": true,
            "inserted_at": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = DevicePayload {
        site_id: Field::Value("site-456".into()),
        ip_address: "192.168.1.100".into(),
        snmp_port: Field::Value(161),
        description: Field::Null,
        ..DevicePayload::default()
    };

    let created = client.create_device(&payload).await.unwrap();

    assert_eq!(created.id, "new-device-id");
    assert_eq!(created.monitoring_enabled, Field::Value(true));
}

#[tokio::test]
async fn test_update_site_patches_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/sites/site-123"))
        .and(body_json(json!({
            "site": { "name": "Updated Site", "snmp_community": "private" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "site-123",
            "name": "Updated Site",
            "location": null,
            "inserted_at": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = SitePayload {
        name: "Updated Site".into(),
        location: Field::Absent,
        snmp_community: Field::Value(Sensitive::new("private")),
    };

    let updated = client.update_site("site-123", &payload).await.unwrap();

    assert_eq!(updated.name, "Updated Site");
    assert!(updated.location.is_null());
    assert!(updated.snmp_community.is_absent());
}

#[tokio::test]
async fn test_enveloped_response_is_accepted() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sites/site-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "site": { "id": "site-123", "name": "Test Site" }
        })))
        .mount(&server)
        .await;

    let site = client.get_site("site-123").await.unwrap();
    assert_eq!(site.id, "site-123");
    assert_eq!(site.name, "Test Site");
}

#[tokio::test]
async fn test_delete_device_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/devices/device-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete::<DeviceKind>("device-123").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_is_distinguished() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "device not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_device("nonexistent-id").await.unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got: {err:?}");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_update_and_delete_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/sites/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/sites/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let payload = SitePayload {
        name: "Gone".into(),
        ..SitePayload::default()
    };
    let update = client.update_site("gone", &payload).await;
    let delete = client.delete_site("gone").await;

    assert!(matches!(update, Err(Error::NotFound { ref path }) if path == "/api/v1/sites/gone"));
    assert!(matches!(delete, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_error_message_is_surfaced_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "name is required" })),
        )
        .mount(&server)
        .await;

    let payload = SitePayload::default();
    let err = client.create_site(&payload).await.unwrap_err();

    let Error::Remote {
        status, message, ..
    } = &err
    else {
        panic!("expected Remote, got: {err:?}");
    };
    assert_eq!(*status, 400);
    assert_eq!(message.as_deref(), Some("name is required"));
    assert_eq!(err.to_string(), "API error (400): name is required");
}

#[tokio::test]
async fn test_validation_error_map() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": { "ip_address": "is invalid", "name": ["is too short", "has invalid format"] }
        })))
        .mount(&server)
        .await;

    let err = client
        .create_device(&DevicePayload::default())
        .await
        .unwrap_err();

    let Error::Remote {
        status,
        message,
        field_errors,
    } = err
    else {
        panic!("expected Remote error");
    };
    assert_eq!(status, 422);
    assert_eq!(message, None);
    assert_eq!(field_errors["ip_address"], "is invalid");
    assert_eq!(field_errors["name"], "is too short, has invalid format");
}

#[tokio::test]
async fn test_error_without_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client.get_site("site-123").await.unwrap_err();

    assert_eq!(err.to_string(), "API error (500): Internal Server Error");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_invalid_json_on_success_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&server)
        .await;

    let payload = DevicePayload {
        ip_address: "10.0.0.1".into(),
        ..DevicePayload::default()
    };
    let result = client.update_device("device-123", &payload).await;

    assert!(
        matches!(result, Err(Error::Decode { .. })),
        "expected Decode error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_error_is_transport() {
    let token: SecretString = "test-token".to_string().into();
    let client =
        ToweropsClient::new("http://127.0.0.1:1", &token, &TransportConfig::default()).unwrap();

    let result = client.get_site("site-123").await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
