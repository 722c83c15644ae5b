//! Connection, authentication, and presence tests.

use http::StatusCode;
use tower::ServiceExt;

use carehub_core::config::AppConfig;
use carehub_entity::identity::UserRole;
use carehub_realtime::connection::authenticator::Claims;
use carehub_realtime::message::types::ServerEvent;

use crate::helpers::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;

    let response = server
        .router()
        .oneshot(
            http::Request::builder()
                .method("GET")
                .uri("/api/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["connections"], 0);
}

#[tokio::test]
async fn test_join_updates_presence() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.join("dr-a", UserRole::Clinician).await;

    assert_eq!(server.state.engine.presence.online_count(), 1);

    client.close().await;
    // Disconnect cleanup is asynchronous; poll briefly.
    for _ in 0..20 {
        if server.state.engine.presence.online_count() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert_eq!(server.state.engine.presence.online_count(), 0);
}

#[tokio::test]
async fn test_second_tab_supersedes_first() {
    let server = TestServer::start().await;
    let mut first = server.client().await;
    first.join("pt-1", UserRole::Patient).await;

    let mut second = server.client().await;
    second.join("pt-1", UserRole::Patient).await;

    match first.recv().await {
        ServerEvent::Superseded => {}
        other => panic!("expected superseded, got: {other:?}"),
    }
    // Still exactly one online identity.
    assert_eq!(server.state.engine.presence.online_count(), 1);
}

#[tokio::test]
async fn test_upgrade_without_token_rejected_when_required() {
    let mut config = AppConfig::default();
    config.realtime.answer_timeout_seconds = 0;
    config.auth.require_token = true;
    config.auth.jwt_secret = "integration-secret".to_string();
    let server = TestServer::start_with(config).await;

    let result = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr)).await;
    assert!(result.is_err(), "upgrade without token must be refused");
}

#[tokio::test]
async fn test_token_binds_identity_at_upgrade() {
    let mut config = AppConfig::default();
    config.realtime.answer_timeout_seconds = 0;
    config.auth.require_token = true;
    config.auth.jwt_secret = "integration-secret".to_string();
    let server = TestServer::start_with(config).await;

    let claims = Claims {
        sub: "dr-a".to_string(),
        name: "Dr. A".to_string(),
        role: "clinician".to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"integration-secret"),
    )
    .unwrap();

    let mut client = server.client_with_token(&token).await;

    // The token pre-binds the identity: the joined ack arrives without
    // an explicit join event.
    match client.recv().await {
        ServerEvent::Joined { identity } => {
            assert_eq!(identity.user_id.as_str(), "dr-a");
        }
        other => panic!("expected joined ack, got: {other:?}"),
    }
    assert_eq!(server.state.engine.presence.online_count(), 1);
}

#[tokio::test]
async fn test_malformed_frame_gets_typed_error() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.join("dr-a", UserRole::Clinician).await;

    client.raw_send("{\"type\":\"not-a-real-event\"}").await;

    match client.recv().await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "VALIDATION"),
        other => panic!("expected error event, got: {other:?}"),
    }

    // The connection survives malformed input.
    client
        .send(&carehub_realtime::message::types::ClientEvent::TypingStart {
            scope: carehub_entity::message::ChatScope::Call(
                carehub_core::types::id::CallId::new("appt-1"),
            ),
            receiver: None,
        })
        .await;
    assert_eq!(server.state.engine.pool.count(), 1);
}
