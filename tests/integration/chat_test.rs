//! Chat, read receipts, subtitles, and typing indicator tests.

use carehub_core::types::id::{CallId, UserId};
use carehub_entity::identity::UserRole;
use carehub_entity::message::{ChatScope, Translation};
use carehub_entity::meeting::MeetingSettings;
use carehub_realtime::message::types::{ClientEvent, ServerEvent};

use crate::helpers::TestServer;

#[tokio::test]
async fn test_direct_chat_and_read_receipt_authorization() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    let mut patient = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;
    patient.join("pt-b", UserRole::Patient).await;

    doctor
        .send(&ClientEvent::SendChatMessage {
            scope: ChatScope::Call(CallId::new("appt-1")),
            receiver: Some(UserId::new("pt-b")),
            text: "Take two of these daily.".to_string(),
            translations: vec![Translation {
                language: "vi".to_string(),
                text: "Uống hai viên mỗi ngày.".to_string(),
            }],
        })
        .await;

    // Sender gets an echo with the persisted flags.
    let message_id = match doctor.recv().await {
        ServerEvent::ChatMessage { message } => {
            assert!(message.is_delivered);
            message.id
        }
        other => panic!("expected chat echo, got: {other:?}"),
    };

    // Receiver gets the message.
    match patient.recv().await {
        ServerEvent::ChatMessage { message } => {
            assert_eq!(message.text, "Take two of these daily.");
            assert_eq!(message.translations.len(), 1);
            assert!(!message.is_read);
        }
        other => panic!("expected chat message, got: {other:?}"),
    }

    // The sender cannot mark their own message read.
    doctor
        .send(&ClientEvent::MarkRead { message_id })
        .await;
    match doctor.recv().await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "AUTHORIZATION"),
        other => panic!("expected error, got: {other:?}"),
    }

    // The receiver can; a second mark is a quiet no-op.
    patient
        .send(&ClientEvent::MarkRead { message_id })
        .await;
    patient
        .send(&ClientEvent::MarkRead { message_id })
        .await;
    patient.assert_silent().await;
}

#[tokio::test]
async fn test_chat_to_offline_user_persists_undelivered() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;

    doctor
        .send(&ClientEvent::SendChatMessage {
            scope: ChatScope::Call(CallId::new("appt-1")),
            receiver: Some(UserId::new("pt-offline")),
            text: "Are you there?".to_string(),
            translations: Vec::new(),
        })
        .await;

    match doctor.recv().await {
        ServerEvent::ChatMessage { message } => {
            assert!(!message.is_delivered);
        }
        other => panic!("expected chat echo, got: {other:?}"),
    }

    // The receiver coming online later does not trigger re-delivery.
    let mut patient = server.client().await;
    patient.join("pt-offline", UserRole::Patient).await;
    patient.assert_silent().await;
}

#[tokio::test]
async fn test_meeting_subtitles_broadcast_only() {
    let server = TestServer::start().await;
    let mut host = server.client().await;
    let mut guest = server.client().await;
    host.join("dr-h", UserRole::Clinician).await;
    guest.join("pt-2", UserRole::Patient).await;

    host.send(&ClientEvent::CreateMeeting {
        settings: MeetingSettings::default(),
    })
    .await;
    let code = match host.recv().await {
        ServerEvent::MeetingCreated { code, .. } => code,
        other => panic!("expected meeting created, got: {other:?}"),
    };
    host.send(&ClientEvent::JoinMeeting { code: code.clone() })
        .await;
    host.recv().await; // meeting_joined
    guest
        .send(&ClientEvent::JoinMeeting { code: code.clone() })
        .await;
    guest.recv().await; // meeting_joined
    host.recv().await; // guest's user_joined

    host.send(&ClientEvent::SendSubtitle {
        code: code.clone(),
        text: "How are you feeling today?".to_string(),
        language: "en".to_string(),
        confidence: 0.97,
        translations: Vec::new(),
    })
    .await;

    match guest.recv().await {
        ServerEvent::Subtitle { subtitle } => {
            assert_eq!(subtitle.speaker.as_str(), "dr-h");
            assert_eq!(subtitle.language, "en");
        }
        other => panic!("expected subtitle, got: {other:?}"),
    }
    // The speaker does not hear their own subtitle.
    host.assert_silent().await;
}

#[tokio::test]
async fn test_typing_indicators_forwarded() {
    let server = TestServer::start().await;
    let mut doctor = server.client().await;
    let mut patient = server.client().await;
    doctor.join("dr-a", UserRole::Clinician).await;
    patient.join("pt-b", UserRole::Patient).await;

    doctor
        .send(&ClientEvent::TypingStart {
            scope: ChatScope::Call(CallId::new("appt-1")),
            receiver: Some(UserId::new("pt-b")),
        })
        .await;
    doctor
        .send(&ClientEvent::TypingStop {
            scope: ChatScope::Call(CallId::new("appt-1")),
            receiver: Some(UserId::new("pt-b")),
        })
        .await;

    assert!(matches!(
        patient.recv().await,
        ServerEvent::TypingStart { .. }
    ));
    assert!(matches!(
        patient.recv().await,
        ServerEvent::TypingStop { .. }
    ));
}
