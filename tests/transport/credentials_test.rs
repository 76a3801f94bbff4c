use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::http_transport;
use sislab_client::modules::auth::AuthCrud;
use sislab_client::services::transport::{ApiRequest, CredentialStore, Transport};

#[tokio::test]
async fn test_bearer_header_attached_when_token_held() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/laboratories/"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = CredentialStore::with_token(Some("tok-123".to_string()));
    let transport = http_transport(&server.uri(), credentials);

    transport.send(ApiRequest::get("/laboratories/")).await.unwrap();
}

#[tokio::test]
async fn test_anonymous_call_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mysql": true, "redis": true, "status": "healthy"
        })))
        .mount(&server)
        .await;

    let transport = http_transport(&server.uri(), CredentialStore::new());
    transport.send(ApiRequest::get("/health")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_login_token_used_by_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({"username": "ana", "password": "secreta"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mensaje": "Login exitoso", "usuario": "ana", "token": "jwt-ana"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/laboratories/items"))
        .and(header("authorization", "Bearer jwt-ana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "source": "MySQL", "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = CredentialStore::new();
    let transport: Arc<dyn Transport> = Arc::new(http_transport(&server.uri(), credentials.clone()));
    let auth = AuthCrud::new(transport.clone(), credentials.clone());

    let response = auth.login("ana", "secreta").await.unwrap();
    assert_eq!(response.usuario, "ana");
    assert_eq!(credentials.user().as_deref(), Some("ana"));

    transport
        .send(ApiRequest::get("/laboratories/items"))
        .await
        .unwrap();
}
