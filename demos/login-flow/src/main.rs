use std::sync::Arc;

use serde_json::{Value, json};
use tollgate::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

/// Plays one user's session lifecycle against an in-memory store:
/// log in, ask "who am I?", let an admin issue a second session, then
/// revoke everything.
#[tokio::main]
async fn main() -> Result<(), TollgateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    store
        .add_user(
            User::new("alice")
                .with_email("alice@example.com")
                .with_channel("public", 1),
            "letmein",
        )
        .await;

    let service = TollgateBuilder::new()
        .tenant("db")
        .session_config(SessionConfig {
            default_ttl_secs: 60 * 60,
            ..SessionConfig::default()
        })
        .build(Arc::clone(&store), Arc::clone(&store))?;

    // --- Login ---
    let login = service
        .handle(
            &RequestContext::anonymous(),
            SessionRequest::Login {
                body: encode(&json!({"name": "alice", "password": "letmein"})),
            },
        )
        .await;
    show("login", &login);

    let Some(cookie) = login.set_cookie.clone() else {
        tracing::error!("login did not issue a cookie");
        return Ok(());
    };

    // --- Who am I? ---
    let ctx = RequestContext::anonymous()
        .with_user(User::new("alice").with_channel("public", 1))
        .with_session_id(cookie.value.clone());
    show("whoami", &service.handle(&ctx, SessionRequest::GetSession).await);

    // --- Admin issues a session out of band ---
    let issued = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminCreate {
                body: encode(&json!({"name": "alice", "ttl": 300})),
            },
        )
        .await;
    show("admin issue", &issued);

    // --- Non-admin tries the same ---
    let denied = service
        .handle(
            &ctx,
            SessionRequest::AdminCreate {
                body: encode(&json!({"name": "alice"})),
            },
        )
        .await;
    show("admin issue from public side", &denied);

    tracing::info!(
        sessions = store.sessions_for("alice").await.len(),
        "alice is logged in twice"
    );

    // --- Logout, then revoke the rest ---
    show("logout", &service.handle(&ctx, SessionRequest::Logout).await);

    let bulk = service
        .handle(
            &RequestContext::admin(),
            SessionRequest::AdminBulkDelete {
                username: "alice".into(),
                body: encode(&json!({"keys": ["*"]})),
            },
        )
        .await;
    show("bulk delete", &bulk);

    tracing::info!(
        sessions = store.sessions_for("alice").await.len(),
        "done"
    );
    Ok(())
}

fn encode(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

fn show(step: &str, response: &Response) {
    let body = String::from_utf8_lossy(&response.body);
    let cookie = match &response.set_cookie {
        Some(c) if c.is_cleared() => "cleared",
        Some(_) => "set",
        None => "none",
    };
    tracing::info!(step, status = response.status, cookie, "response");
    // Bodies can carry session ids.
    tracing::debug!(step, %body, "response body");
}
