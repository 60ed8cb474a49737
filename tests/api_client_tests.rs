use std::sync::Arc;

use gatilho::{
    error::GatilhoError,
    events::{self, ClientEvent},
    models::{AlertKind, Condition, CreateAlertPayload, Session},
    services::{
        api_client::ApiClient,
        session_store::{FileSessionStore, MemorySessionStore, SessionStorage},
    },
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn session() -> Session {
    Session {
        token: "tok-123".into(),
        user_id: 7,
    }
}

fn alert_json(id: i64, ticker: &str) -> serde_json::Value {
    json!({
        "id": id,
        "ticker": ticker,
        "alert_type": "price",
        "target_value": 40.0,
        "condition": ">",
        "is_active": true,
        "triggered": false,
        "created_at": "2025-03-01T12:00:00"
    })
}

async fn client(
    server: &MockServer,
    store: Arc<MemorySessionStore>,
) -> (ApiClient, tokio::sync::broadcast::Receiver<ClientEvent>) {
    let (tx, rx) = events::channel();
    let api = ApiClient::new(format!("{}/api", server.uri()), store, tx);
    (api, rx)
}

#[tokio::test]
async fn attaches_bearer_token_and_user_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(header("authorization", "Bearer tok-123"))
        .and(query_param("user_id", "7"))
        .and(query_param("active_only", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json(1, "PETR4")])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, _rx) = client(&server, store).await;

    let alerts = api.list_active(7).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].ticker, "PETR4");
}

#[tokio::test]
async fn list_all_asks_for_inactive_too() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("active_only", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, _rx) = client(&server, store).await;

    assert!(api.list_all(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn login_sends_no_token_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "bearer",
            "user_id": 12
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let (api, _rx) = client(&server, store).await;

    let res = api.login("ana@example.com", "secret1").await.unwrap();
    assert_eq!(res.user_id, 12);

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn corrupt_session_file_does_not_block_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "bearer",
            "user_id": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    std::fs::write(&file, "{truncated").unwrap();

    let store: Arc<dyn SessionStorage> = Arc::new(FileSessionStore::new(&file));
    let (tx, _rx) = events::channel();
    let api = ApiClient::new(format!("{}/api", server.uri()), store.clone(), tx);

    let res = api.login("ana@example.com", "secret1").await.unwrap();
    assert_eq!(res.user_id, 12);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    // the broken file is gone, so the next load is a clean logout
    assert!(!file.exists());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn create_alert_posts_exact_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alerts"))
        .and(body_json(json!({
            "user_id": 7,
            "ticker": "VALE3",
            "alert_type": "volume",
            "target_value": 1.5,
            "condition": "<="
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(alert_json(33, "VALE3")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, mut rx) = client(&server, store).await;

    let payload = CreateAlertPayload {
        user_id: 7,
        ticker: "VALE3".into(),
        alert_type: AlertKind::Volume,
        target_value: 1.5,
        condition: Condition::AtOrBelow,
    };

    let alert = api.create_alert(&payload).await.unwrap();
    assert_eq!(alert.id, 33);
    assert_eq!(rx.try_recv().unwrap(), ClientEvent::AlertsUpdated);
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, mut rx) = client(&server, store.clone()).await;

    let err = api.stats(7).await.unwrap_err();
    assert!(matches!(err, GatilhoError::Unauthorized));
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(rx.try_recv().unwrap(), ClientEvent::RedirectToLogin);
}

#[tokio::test]
async fn unauthorized_on_delete_account_also_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/user/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, mut rx) = client(&server, store.clone()).await;

    assert!(matches!(
        api.delete_account(7).await,
        Err(GatilhoError::Unauthorized)
    ));
    assert!(store.load().unwrap().is_none());
    assert_eq!(rx.try_recv().unwrap(), ClientEvent::RedirectToLogin);
}

#[tokio::test]
async fn other_errors_keep_session_and_carry_detail() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/alerts/99"))
        .and(query_param("user_id", "7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Alerta não encontrado"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, mut rx) = client(&server, store.clone()).await;

    match api.delete_alert(99, 7).await {
        Err(GatilhoError::Http { status, detail }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Alerta não encontrado");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert_eq!(store.load().unwrap(), Some(session()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn change_password_body_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/change-password"))
        .and(query_param("user_id", "7"))
        .and(body_json(json!({"current_password": "old123", "new_password": "new456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Senha alterada com sucesso"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, _rx) = client(&server, store).await;

    let res = api.change_password(7, "old123", "new456").await.unwrap();
    assert_eq!(res.message, "Senha alterada com sucesso");
}

#[tokio::test]
async fn suggested_values_upper_cases_ticker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions/values"))
        .and(query_param("ticker", "ITUB4"))
        .and(query_param("alert_type", "percentage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"average": 3.5, "suggestions": [2.0, 5.0]})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(session()));
    let (api, _rx) = client(&server, store).await;

    let values = api.suggested_values("itub4", AlertKind::Percentage).await.unwrap();
    assert_eq!(values.average, Some(3.5));
    assert_eq!(values.suggestions, [2.0, 5.0]);
}
