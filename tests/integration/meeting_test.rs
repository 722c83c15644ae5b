//! Meeting coordination tests over real sockets.

use carehub_core::types::id::MeetingCode;
use carehub_entity::identity::UserRole;
use carehub_entity::meeting::{MeetingSettings, RecordingStatus};
use carehub_realtime::message::types::{ClientEvent, MeetingNotice, ServerEvent};

use crate::helpers::{TestServer, WsClient};

async fn create_meeting(host: &mut WsClient) -> MeetingCode {
    host.send(&ClientEvent::CreateMeeting {
        settings: MeetingSettings::default(),
    })
    .await;
    match host.recv().await {
        ServerEvent::MeetingCreated { code, .. } => code,
        other => panic!("expected meeting created, got: {other:?}"),
    }
}

async fn join_meeting(client: &mut WsClient, code: &MeetingCode) -> Vec<String> {
    client
        .send(&ClientEvent::JoinMeeting { code: code.clone() })
        .await;
    loop {
        match client.recv().await {
            ServerEvent::MeetingJoined { participants, .. } => {
                return participants
                    .into_iter()
                    .map(|i| i.user_id.0)
                    .collect()
            }
            // Skip broadcasts that raced ahead of the join response.
            ServerEvent::UserJoined { .. } => continue,
            other => panic!("expected meeting joined, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_three_party_join_snapshots() {
    let server = TestServer::start().await;
    let mut host = server.client().await;
    let mut second = server.client().await;
    let mut third = server.client().await;
    host.join("dr-h", UserRole::Clinician).await;
    second.join("pt-2", UserRole::Patient).await;
    third.join("pt-3", UserRole::Patient).await;

    let code = create_meeting(&mut host).await;

    assert!(join_meeting(&mut host, &code).await.is_empty());
    assert_eq!(join_meeting(&mut second, &code).await, vec!["dr-h"]);
    let mut snapshot = join_meeting(&mut third, &code).await;
    snapshot.sort();
    assert_eq!(snapshot, vec!["dr-h", "pt-2"]);

    // Host saw both later joiners, the second joiner saw one, the
    // third saw none: two user_joined broadcasts in total.
    for expected_id in ["pt-2", "pt-3"] {
        match host.recv().await {
            ServerEvent::UserJoined { identity, .. } => {
                assert_eq!(identity.user_id.as_str(), expected_id)
            }
            other => panic!("expected user joined, got: {other:?}"),
        }
    }
    host.assert_silent().await;
    third.assert_silent().await;
}

#[tokio::test]
async fn test_recording_is_host_only() {
    let server = TestServer::start().await;
    let mut host = server.client().await;
    let mut guest = server.client().await;
    host.join("dr-h", UserRole::Clinician).await;
    guest.join("pt-2", UserRole::Patient).await;

    let code = create_meeting(&mut host).await;
    join_meeting(&mut host, &code).await;
    join_meeting(&mut guest, &code).await;
    host.recv().await; // guest's user_joined

    // Guest's attempt is refused with no state change.
    guest
        .send(&ClientEvent::StartRecording { code: code.clone() })
        .await;
    match guest.recv().await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "AUTHORIZATION"),
        other => panic!("expected error, got: {other:?}"),
    }
    assert_eq!(
        server.state.engine.rooms.meeting(&code).unwrap().recording,
        RecordingStatus::Idle
    );

    // Host toggles; everyone hears.
    host.send(&ClientEvent::StartRecording { code: code.clone() })
        .await;
    for client in [&mut host, &mut guest] {
        match client.recv().await {
            ServerEvent::RecordingStatus { status, .. } => {
                assert_eq!(status, RecordingStatus::Recording)
            }
            other => panic!("expected recording status, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_leave_broadcasts_and_implies_end() {
    let server = TestServer::start().await;
    let mut host = server.client().await;
    let mut guest = server.client().await;
    host.join("dr-h", UserRole::Clinician).await;
    guest.join("pt-2", UserRole::Patient).await;

    let code = create_meeting(&mut host).await;
    join_meeting(&mut host, &code).await;
    join_meeting(&mut guest, &code).await;
    host.recv().await; // guest's user_joined

    guest
        .send(&ClientEvent::LeaveMeeting { code: code.clone() })
        .await;
    match host.recv().await {
        ServerEvent::UserLeft { user_id, .. } => assert_eq!(user_id.as_str(), "pt-2"),
        other => panic!("expected user left, got: {other:?}"),
    }

    // Last participant leaving ends the meeting.
    host.send(&ClientEvent::LeaveMeeting { code: code.clone() })
        .await;
    for _ in 0..20 {
        if server.state.engine.rooms.meeting(&code).is_none() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(server.state.engine.rooms.meeting(&code).is_none());
}

#[tokio::test]
async fn test_screen_share_notice_reaches_others() {
    let server = TestServer::start().await;
    let mut host = server.client().await;
    let mut guest = server.client().await;
    host.join("dr-h", UserRole::Clinician).await;
    guest.join("pt-2", UserRole::Patient).await;

    let code = create_meeting(&mut host).await;
    join_meeting(&mut host, &code).await;
    join_meeting(&mut guest, &code).await;
    host.recv().await; // guest's user_joined

    host.send(&ClientEvent::ScreenShare {
        code: code.clone(),
        active: true,
    })
    .await;

    match guest.recv().await {
        ServerEvent::MeetingNotice { from, notice, .. } => {
            assert_eq!(from.as_str(), "dr-h");
            assert_eq!(notice, MeetingNotice::ScreenShare { active: true });
        }
        other => panic!("expected meeting notice, got: {other:?}"),
    }
    host.assert_silent().await;
}

#[tokio::test]
async fn test_join_unknown_meeting_fails() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    client.join("pt-2", UserRole::Patient).await;

    client
        .send(&ClientEvent::JoinMeeting {
            code: MeetingCode::new("zzz-0000-zzz"),
        })
        .await;
    match client.recv().await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "NOT_FOUND"),
        other => panic!("expected error, got: {other:?}"),
    }
}
