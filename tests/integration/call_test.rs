//! Two-party call flow tests over real sockets.

use serde_json::json;

use carehub_core::types::id::{CallId, UserId};
use carehub_entity::identity::UserRole;
use carehub_realtime::message::types::{ClientEvent, ServerEvent};

use crate::helpers::TestServer;

#[tokio::test]
async fn test_full_call_flow() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    let mut patient = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;
    patient.join("pt-b", UserRole::Patient).await;

    // Ring.
    doctor
        .send(&ClientEvent::CallUser {
            call_id: CallId::new("appt-77"),
            receiver: UserId::new("pt-b"),
        })
        .await;
    match patient.recv().await {
        ServerEvent::IncomingCall { call_id, caller } => {
            assert_eq!(call_id.as_str(), "appt-77");
            assert_eq!(caller.user_id.as_str(), "dr-a");
        }
        other => panic!("expected incoming call, got: {other:?}"),
    }

    // Accept: the answer signal reaches the caller through the relay.
    patient
        .send(&ClientEvent::AnswerCall {
            call_id: CallId::new("appt-77"),
            signal: json!({"type": "answer", "sdp": "v=0..."}),
        })
        .await;
    match doctor.recv().await {
        ServerEvent::Signal {
            kind, from, signal, ..
        } => {
            assert_eq!(kind, "answer");
            assert_eq!(from.as_str(), "pt-b");
            assert_eq!(signal["sdp"], "v=0...");
        }
        other => panic!("expected answer signal, got: {other:?}"),
    }

    // ICE trickle both ways.
    doctor
        .send(&ClientEvent::Signal {
            call_id: CallId::new("appt-77"),
            kind: "ice-candidate".to_string(),
            target: UserId::new("pt-b"),
            signal: json!({"candidate": "candidate:1"}),
        })
        .await;
    match patient.recv().await {
        ServerEvent::Signal { kind, .. } => assert_eq!(kind, "ice-candidate"),
        other => panic!("expected ice signal, got: {other:?}"),
    }

    // Hang up.
    doctor
        .send(&ClientEvent::EndCall {
            call_id: CallId::new("appt-77"),
        })
        .await;
    match patient.recv().await {
        ServerEvent::CallEnded { call_id } => assert_eq!(call_id.as_str(), "appt-77"),
        other => panic!("expected call ended, got: {other:?}"),
    }
    assert_eq!(server.state.engine.calls.active_count(), 0);
}

#[tokio::test]
async fn test_call_to_offline_user_fails() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;

    doctor
        .send(&ClientEvent::CallUser {
            call_id: CallId::new("appt-1"),
            receiver: UserId::new("pt-nowhere"),
        })
        .await;

    match doctor.recv().await {
        ServerEvent::CallFailed { reason, .. } => assert_eq!(reason, "user not available"),
        other => panic!("expected call failed, got: {other:?}"),
    }
    assert_eq!(server.state.engine.calls.active_count(), 0);
}

#[tokio::test]
async fn test_reject_call() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    let mut patient = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;
    patient.join("pt-b", UserRole::Patient).await;

    doctor
        .send(&ClientEvent::CallUser {
            call_id: CallId::new("appt-1"),
            receiver: UserId::new("pt-b"),
        })
        .await;
    patient.recv().await; // incoming_call

    patient
        .send(&ClientEvent::RejectCall {
            call_id: CallId::new("appt-1"),
        })
        .await;

    match doctor.recv().await {
        ServerEvent::CallRejected { call_id } => assert_eq!(call_id.as_str(), "appt-1"),
        other => panic!("expected call rejected, got: {other:?}"),
    }
    assert_eq!(server.state.engine.calls.active_count(), 0);
}

#[tokio::test]
async fn test_disconnect_mid_call_notifies_counterpart() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    let mut patient = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;
    patient.join("pt-b", UserRole::Patient).await;

    doctor
        .send(&ClientEvent::CallUser {
            call_id: CallId::new("appt-1"),
            receiver: UserId::new("pt-b"),
        })
        .await;
    patient.recv().await; // incoming_call
    patient
        .send(&ClientEvent::AnswerCall {
            call_id: CallId::new("appt-1"),
            signal: json!({"sdp": "answer"}),
        })
        .await;
    doctor.recv().await; // answer signal

    // The browser tab vanishes.
    doctor.close().await;

    match patient.recv().await {
        ServerEvent::CallEnded { call_id } => assert_eq!(call_id.as_str(), "appt-1"),
        other => panic!("expected call ended, got: {other:?}"),
    }
    assert_eq!(server.state.engine.calls.active_count(), 0);
}
