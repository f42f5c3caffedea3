//! Integration tests for the session endpoints, driven through
//! `SessionService::handle` the way an HTTP layer would.

use std::sync::Arc;

use serde_json::{Value, json};
use tollgate::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Service = SessionService<Arc<MemoryStore>, Arc<MemoryStore>>;

async fn setup() -> (Service, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .add_user(User::new("alice").with_channel("public", 2), "letmein")
        .await;
    store.add_user(User::new("bob"), "hunter2").await;

    let service = TollgateBuilder::new()
        .tenant("db")
        .build(Arc::clone(&store), Arc::clone(&store))
        .expect("valid config");
    (service, store)
}

fn body_json(response: &Response) -> Value {
    serde_json::from_slice(&response.body).expect("response body is JSON")
}

fn login_body(name: &str, password: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({"name": name, "password": password})).unwrap()
}

async fn login(service: &Service, name: &str, password: &str) -> Response {
    service
        .handle(
            &RequestContext::anonymous(),
            SessionRequest::Login {
                body: login_body(name, password),
            },
        )
        .await
}

async fn admin_issue(service: &Service, body: Value) -> Response {
    service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminCreate {
                body: serde_json::to_vec(&body).unwrap(),
            },
        )
        .await
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[test]
fn test_build_without_tenant_is_config_error() {
    let store = Arc::new(MemoryStore::new());
    let result = TollgateBuilder::new().build(Arc::clone(&store), store);
    assert!(matches!(result, Err(TollgateError::Config(_))));
}

#[test]
fn test_build_rejects_tenant_with_slash() {
    let store = Arc::new(MemoryStore::new());
    let result = TollgateBuilder::new()
        .tenant("a/b")
        .build(Arc::clone(&store), store);
    assert!(matches!(result, Err(TollgateError::Config(_))));
}

// ---------------------------------------------------------------------------
// Public actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_session_anonymous_returns_guest_view() {
    let (service, _) = setup().await;

    let response = service
        .handle(&RequestContext::anonymous(), SessionRequest::GetSession)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        body_json(&response),
        json!({
            "ok": true,
            "userCtx": {"name": null, "channels": {}},
            "authentication_handlers": ["default", "cookie"]
        })
    );
}

#[tokio::test]
async fn test_get_session_lists_persona_when_enabled() {
    let store = Arc::new(MemoryStore::new());
    let service = TollgateBuilder::new()
        .tenant("db")
        .session_config(SessionConfig {
            persona_enabled: true,
            ..SessionConfig::default()
        })
        .build(Arc::clone(&store), store)
        .unwrap();

    let response = service
        .handle(&RequestContext::anonymous(), SessionRequest::GetSession)
        .await;

    assert_eq!(
        body_json(&response)["authentication_handlers"],
        json!(["default", "cookie", "persona"])
    );
}

#[tokio::test]
async fn test_login_sets_cookie_scoped_to_tenant() {
    let (service, store) = setup().await;

    let response = login(&service, "alice", "letmein").await;

    assert_eq!(response.status, 200);
    let body = body_json(&response);
    assert_eq!(body["userCtx"]["name"], "alice");
    assert_eq!(body["userCtx"]["channels"], json!({"public": 2}));

    let cookie = response.set_cookie.as_ref().expect("login sets a cookie");
    assert_eq!(cookie.name, "TollgateSession");
    assert_eq!(cookie.path, "/db/");
    let header = response.set_cookie_header().unwrap();
    assert!(header.starts_with(&format!("TollgateSession={}; Path=/db/;", cookie.value)));

    let sessions = store.sessions_for("alice").await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, cookie.value);
}

#[tokio::test]
async fn test_login_wrong_password_is_401_without_cookie() {
    let (service, store) = setup().await;

    let response = login(&service, "alice", "nope").await;

    assert_eq!(response.status, 401);
    assert!(response.set_cookie.is_none());
    assert_eq!(
        body_json(&response),
        json!({"error": "Unauthorized", "reason": "invalid login"})
    );
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_login_malformed_body_is_400() {
    let (service, _) = setup().await;

    let response = service
        .handle(
            &RequestContext::anonymous(),
            SessionRequest::Login {
                body: b"{name:".to_vec(),
            },
        )
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(body_json(&response)["error"], "Bad Request");
}

#[tokio::test]
async fn test_admin_create_empty_body_is_400() {
    let (service, store) = setup().await;

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminCreate { body: Vec::new() },
        )
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(
        body_json(&response),
        json!({
            "error": "Bad Request",
            "reason": "invalid message: request body is empty"
        })
    );
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_deletes_session() {
    let (service, store) = setup().await;
    let login = login(&service, "alice", "letmein").await;
    let id = login.set_cookie.unwrap().value;

    let response = service
        .handle(
            &RequestContext::anonymous().with_session_id(id.clone()),
            SessionRequest::Logout,
        )
        .await;

    assert_eq!(response.status, 200);
    let cleared = response.set_cookie.expect("logout clears the cookie");
    assert!(cleared.is_cleared());
    assert_eq!(cleared.path, "/db/");
    assert!(store.sessions_for("alice").await.is_empty());
}

#[tokio::test]
async fn test_logout_without_session_is_404() {
    let (service, _) = setup().await;

    let response = service
        .handle(&RequestContext::anonymous(), SessionRequest::Logout)
        .await;

    assert_eq!(response.status, 404);
    assert_eq!(
        body_json(&response),
        json!({"error": "Not Found", "reason": "no session"})
    );
    assert!(response.set_cookie.is_none());
}

#[tokio::test]
async fn test_logout_unknown_session_is_404() {
    let (service, _) = setup().await;

    let response = service
        .handle(
            &RequestContext::anonymous().with_session_id("deadbeef"),
            SessionRequest::Logout,
        )
        .await;

    assert_eq!(response.status, 404);
    // The id the caller sent never appears in the error.
    assert!(!String::from_utf8_lossy(&response.body).contains("deadbeef"));
}

#[tokio::test]
async fn test_verified_login_provisions_unknown_identity() {
    let (service, store) = setup().await;

    let response = service
        .handle(
            &RequestContext::anonymous(),
            SessionRequest::VerifiedLogin {
                identity: "a@b.com".into(),
                create_user_if_needed: true,
            },
        )
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(body_json(&response)["userCtx"]["name"], "a@b.com");
    assert!(response.set_cookie.is_some());
    assert_eq!(store.sessions_for("a@b.com").await.len(), 1);
}

#[tokio::test]
async fn test_verified_login_unknown_identity_without_provisioning_is_401() {
    let (service, store) = setup().await;

    let response = service
        .handle(
            &RequestContext::anonymous(),
            SessionRequest::VerifiedLogin {
                identity: "a@b.com".into(),
                create_user_if_needed: false,
            },
        )
        .await;

    assert_eq!(response.status, 401);
    assert_eq!(store.session_count().await, 0);
}

// ---------------------------------------------------------------------------
// Admin gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_admin_action_on_public_interface_is_403() {
    let (service, store) = setup().await;

    let response = service
        .handle(
            &RequestContext::anonymous().with_user(User::new("alice")),
            SessionRequest::AdminCreate {
                body: br#"{"name":"alice"}"#.to_vec(),
            },
        )
        .await;

    assert_eq!(response.status, 403);
    assert_eq!(body_json(&response)["error"], "Forbidden");
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_custom_admin_gate_is_consulted() {
    let store = Arc::new(MemoryStore::new());
    store.add_user(User::new("alice"), "pw").await;
    let service = TollgateBuilder::new()
        .tenant("db")
        .admin_gate(|ctx| ctx.user.as_ref().is_some_and(|u| u.name == "root"))
        .build(Arc::clone(&store), Arc::clone(&store))
        .unwrap();
    let body = br#"{"name":"alice"}"#.to_vec();

    let denied = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminCreate { body: body.clone() },
        )
        .await;
    let allowed = service
        .handle(
            &RequestContext::anonymous().with_user(User::new("root")),
            SessionRequest::AdminCreate { body },
        )
        .await;

    assert_eq!(denied.status, 403);
    assert_eq!(allowed.status, 200);
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_admin_create_returns_descriptor_without_cookie() {
    let (service, store) = setup().await;

    let response = admin_issue(&service, json!({"name": "alice", "ttl": 60})).await;

    assert_eq!(response.status, 200);
    assert!(response.set_cookie.is_none());
    let body = body_json(&response);
    assert_eq!(body["cookie_name"], "TollgateSession");
    let id = body["session_id"].as_str().unwrap();
    assert_eq!(store.sessions_for("alice").await[0].id, id);
    assert!(body["expires"].is_string());
}

#[tokio::test]
async fn test_admin_create_rejects_guest_and_bad_ttl() {
    let (service, _) = setup().await;

    for body in [
        json!({"name": "GUEST"}),
        json!({"name": ""}),
        json!({"name": "alice", "ttl": 0}),
        json!({"name": "alice", "ttl": -5}),
    ] {
        let response = admin_issue(&service, body.clone()).await;
        assert_eq!(response.status, 400, "body {body} should be rejected");
    }
}

#[tokio::test]
async fn test_admin_create_unknown_user_is_404() {
    let (service, _) = setup().await;

    let response = admin_issue(&service, json!({"name": "carol"})).await;

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_admin_get_renders_owner_view() {
    let (service, _) = setup().await;
    let issued = admin_issue(&service, json!({"name": "alice"})).await;
    let id = body_json(&issued)["session_id"].as_str().unwrap().to_string();

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminGet { session_id: id },
        )
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(body_json(&response)["userCtx"]["name"], "alice");
}

#[tokio::test]
async fn test_admin_get_dangling_session_renders_anonymous() {
    let (service, store) = setup().await;
    let issued = admin_issue(&service, json!({"name": "bob"})).await;
    let id = body_json(&issued)["session_id"].as_str().unwrap().to_string();
    store.remove_user("bob").await;

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminGet { session_id: id },
        )
        .await;

    assert_eq!(response.status, 200);
    assert!(body_json(&response)["userCtx"]["name"].is_null());
}

#[tokio::test]
async fn test_admin_get_unknown_session_is_404() {
    let (service, _) = setup().await;

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminGet {
                session_id: "missing".into(),
            },
        )
        .await;

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_admin_delete_with_wrong_owner_is_silent_noop() {
    let (service, store) = setup().await;
    let issued = admin_issue(&service, json!({"name": "alice"})).await;
    let id = body_json(&issued)["session_id"].as_str().unwrap().to_string();

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminDelete {
                session_id: id,
                username: Some("bob".into()),
            },
        )
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(store.sessions_for("alice").await.len(), 1);
}

#[tokio::test]
async fn test_admin_delete_unscoped_removes_session() {
    let (service, store) = setup().await;
    let issued = admin_issue(&service, json!({"name": "alice"})).await;
    let id = body_json(&issued)["session_id"].as_str().unwrap().to_string();

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminDelete {
                session_id: id,
                username: None,
            },
        )
        .await;

    assert_eq!(response.status, 200);
    assert!(response.set_cookie.is_none());
    assert!(store.sessions_for("alice").await.is_empty());
}

#[tokio::test]
async fn test_admin_bulk_delete_wildcard() {
    let (service, store) = setup().await;
    for _ in 0..3 {
        admin_issue(&service, json!({"name": "alice"})).await;
    }
    admin_issue(&service, json!({"name": "bob"})).await;

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminBulkDelete {
                username: "alice".into(),
                body: br#"{"keys":["*"]}"#.to_vec(),
            },
        )
        .await;

    assert_eq!(response.status, 200);
    assert!(store.sessions_for("alice").await.is_empty());
    assert_eq!(store.sessions_for("bob").await.len(), 1);
}

#[tokio::test]
async fn test_admin_bulk_delete_non_string_key_is_400() {
    let (service, store) = setup().await;
    admin_issue(&service, json!({"name": "alice"})).await;

    let response = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminBulkDelete {
                username: "alice".into(),
                body: br#"{"keys":["*", 1]}"#.to_vec(),
            },
        )
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(store.sessions_for("alice").await.len(), 1);
}

#[tokio::test]
async fn test_service_clones_share_state() {
    let (service, store) = setup().await;
    let other = service.clone();

    let response = login(&other, "bob", "hunter2").await;

    assert_eq!(response.status, 200);
    assert_eq!(service.tenant(), "db");
    assert_eq!(store.sessions_for("bob").await.len(), 1);
}
