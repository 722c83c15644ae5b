//! Inbound and outbound event definitions.
//!
//! The wire protocol is a closed tagged union: every event carries a
//! `type` discriminator, and payload shapes are fixed per variant.
//! Unknown types or malformed payloads fail deserialization at the
//! boundary, before any registry or session state is touched.
//!
//! Event names mix snake_case and kebab-case; the protocol predates this
//! server and browser clients depend on the exact strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use carehub_core::types::id::{CallId, MeetingCode, MessageId, UserId};
use carehub_entity::identity::Identity;
use carehub_entity::meeting::{MeetingSettings, RecordingStatus};
use carehub_entity::message::{ChatMessage, ChatScope, Subtitle, Translation};

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Announce identity; upserts the presence registry.
    Join {
        /// Who this connection belongs to.
        identity: Identity,
    },
    /// Start a two-party call.
    CallUser {
        /// External appointment/conversation id.
        call_id: CallId,
        /// Who to ring.
        receiver: UserId,
    },
    /// Accept a ringing call and forward the answer signal.
    AnswerCall {
        /// The ringing call.
        call_id: CallId,
        /// Opaque WebRTC answer payload.
        signal: Value,
    },
    /// Decline a ringing call.
    RejectCall {
        /// The ringing call.
        call_id: CallId,
    },
    /// Hang up.
    EndCall {
        /// The call to terminate.
        call_id: CallId,
    },
    /// Relay an opaque negotiation payload to another party.
    Signal {
        /// Call the negotiation belongs to.
        call_id: CallId,
        /// Payload kind (offer/answer/ice-candidate/...); opaque here.
        kind: String,
        /// Destination identity.
        target: UserId,
        /// Opaque payload, forwarded verbatim.
        signal: Value,
    },
    /// Create a meeting and become its host.
    #[serde(rename = "create-meeting")]
    CreateMeeting {
        /// Initial settings.
        #[serde(default)]
        settings: MeetingSettings,
    },
    /// Join a meeting by code.
    #[serde(rename = "join-meeting")]
    JoinMeeting {
        /// Meeting code.
        code: MeetingCode,
    },
    /// Leave a meeting.
    #[serde(rename = "leave-meeting")]
    LeaveMeeting {
        /// Meeting code.
        code: MeetingCode,
    },
    /// End a meeting (host only).
    #[serde(rename = "end-meeting")]
    EndMeeting {
        /// Meeting code.
        code: MeetingCode,
    },
    /// Remove a participant (host only).
    #[serde(rename = "remove-participant")]
    RemoveParticipant {
        /// Meeting code.
        code: MeetingCode,
        /// Who to remove.
        target: UserId,
    },
    /// Replace meeting settings (host only).
    #[serde(rename = "update-settings")]
    UpdateSettings {
        /// Meeting code.
        code: MeetingCode,
        /// New settings.
        settings: MeetingSettings,
    },
    /// Start recording (host only).
    #[serde(rename = "start-recording")]
    StartRecording {
        /// Meeting code.
        code: MeetingCode,
    },
    /// Stop recording (host only).
    #[serde(rename = "stop-recording")]
    StopRecording {
        /// Meeting code.
        code: MeetingCode,
    },
    /// Send a chat message.
    #[serde(rename = "send-chat-message")]
    SendChatMessage {
        /// Call or meeting the message belongs to.
        scope: ChatScope,
        /// Receiver for direct messages; `None` broadcasts to the meeting.
        #[serde(default)]
        receiver: Option<UserId>,
        /// Message text.
        text: String,
        /// Pre-computed translations.
        #[serde(default)]
        translations: Vec<Translation>,
    },
    /// Mark a received chat message as read.
    #[serde(rename = "mark-read")]
    MarkRead {
        /// The message.
        message_id: MessageId,
    },
    /// Broadcast a live subtitle to a meeting.
    #[serde(rename = "send-subtitle")]
    SendSubtitle {
        /// Meeting code.
        code: MeetingCode,
        /// Recognized text.
        text: String,
        /// Spoken language tag.
        language: String,
        /// Recognition confidence in `[0, 1]`.
        confidence: f32,
        /// Pre-computed translations.
        #[serde(default)]
        translations: Vec<Translation>,
    },
    /// The sender started typing.
    TypingStart {
        /// Call or meeting scope.
        scope: ChatScope,
        /// Receiver for direct chats; `None` broadcasts to the meeting.
        #[serde(default)]
        receiver: Option<UserId>,
    },
    /// The sender stopped typing.
    TypingStop {
        /// Call or meeting scope.
        scope: ChatScope,
        /// Receiver for direct chats; `None` broadcasts to the meeting.
        #[serde(default)]
        receiver: Option<UserId>,
    },
    /// Screen share started or stopped. Fire-and-forget broadcast.
    #[serde(rename = "screen-share")]
    ScreenShare {
        /// Meeting code.
        code: MeetingCode,
        /// Whether sharing is now active.
        active: bool,
    },
    /// Hand raised or lowered. Fire-and-forget broadcast.
    #[serde(rename = "raise-hand")]
    RaiseHand {
        /// Meeting code.
        code: MeetingCode,
        /// Whether the hand is now raised.
        raised: bool,
    },
    /// Microphone muted or unmuted. Fire-and-forget broadcast.
    #[serde(rename = "toggle-mute")]
    ToggleMute {
        /// Meeting code.
        code: MeetingCode,
        /// Whether audio is now muted.
        muted: bool,
    },
    /// Camera enabled or disabled. Fire-and-forget broadcast.
    #[serde(rename = "toggle-camera")]
    ToggleCamera {
        /// Meeting code.
        code: MeetingCode,
        /// Whether video is now enabled.
        enabled: bool,
    },
    /// Virtual background changed. Fire-and-forget broadcast.
    #[serde(rename = "virtual-background")]
    VirtualBackground {
        /// Meeting code.
        code: MeetingCode,
        /// Background asset id, `None` to clear.
        #[serde(default)]
        background: Option<String>,
    },
}

/// In-meeting notifications carried by [`ServerEvent::MeetingNotice`].
///
/// These are pure rebroadcasts with no persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeetingNotice {
    /// Screen share started or stopped.
    ScreenShare {
        /// Whether sharing is now active.
        active: bool,
    },
    /// Hand raised or lowered.
    RaiseHand {
        /// Whether the hand is now raised.
        raised: bool,
    },
    /// Microphone muted or unmuted.
    Mute {
        /// Whether audio is now muted.
        muted: bool,
    },
    /// Camera enabled or disabled.
    Camera {
        /// Whether video is now enabled.
        enabled: bool,
    },
    /// Virtual background changed.
    VirtualBackground {
        /// Background asset id, `None` to clear.
        background: Option<String>,
    },
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Presence upsert acknowledged.
    Joined {
        /// The identity now bound to the connection.
        identity: Identity,
    },
    /// A newer connection for the same identity replaced this one.
    Superseded,
    /// Someone is calling.
    IncomingCall {
        /// External appointment/conversation id.
        call_id: CallId,
        /// Who is calling.
        caller: Identity,
    },
    /// A call could not be placed or was abandoned.
    CallFailed {
        /// The failed call.
        call_id: CallId,
        /// Failure reason, e.g. `"user not available"`.
        reason: String,
    },
    /// The receiver declined.
    CallRejected {
        /// The rejected call.
        call_id: CallId,
    },
    /// The other party hung up or disconnected.
    CallEnded {
        /// The terminated call.
        call_id: CallId,
    },
    /// The ring was cancelled before the receiver answered.
    CallCancelled {
        /// The cancelled call.
        call_id: CallId,
    },
    /// A relayed negotiation payload.
    Signal {
        /// Call the negotiation belongs to.
        call_id: CallId,
        /// Payload kind, carried verbatim.
        kind: String,
        /// Originating identity.
        from: UserId,
        /// Opaque payload, carried verbatim.
        signal: Value,
    },
    /// A meeting was created; the requester is its host.
    MeetingCreated {
        /// Shareable meeting code.
        code: MeetingCode,
        /// Initial settings.
        settings: MeetingSettings,
    },
    /// Join succeeded; snapshot of who else is in the room right now.
    MeetingJoined {
        /// Meeting code.
        code: MeetingCode,
        /// Other current participants, in no guaranteed order.
        participants: Vec<Identity>,
    },
    /// Another participant joined.
    UserJoined {
        /// Meeting code.
        code: MeetingCode,
        /// Who joined.
        identity: Identity,
    },
    /// A participant left.
    UserLeft {
        /// Meeting code.
        code: MeetingCode,
        /// Who left.
        user_id: UserId,
    },
    /// The meeting ended.
    MeetingEnded {
        /// Meeting code.
        code: MeetingCode,
    },
    /// The host removed a participant.
    ParticipantRemoved {
        /// Meeting code.
        code: MeetingCode,
        /// Who was removed.
        user_id: UserId,
    },
    /// The host changed the settings.
    SettingsUpdated {
        /// Meeting code.
        code: MeetingCode,
        /// The new settings.
        settings: MeetingSettings,
    },
    /// Recording was toggled.
    RecordingStatus {
        /// Meeting code.
        code: MeetingCode,
        /// The new recording state.
        status: RecordingStatus,
    },
    /// A chat message was delivered to this connection.
    ChatMessage {
        /// The message, including its persisted id and flags.
        message: ChatMessage,
    },
    /// A live subtitle was broadcast.
    Subtitle {
        /// The subtitle entry.
        subtitle: Subtitle,
    },
    /// Someone started typing.
    TypingStart {
        /// Call or meeting scope.
        scope: ChatScope,
        /// Who is typing.
        from: UserId,
    },
    /// Someone stopped typing.
    TypingStop {
        /// Call or meeting scope.
        scope: ChatScope,
        /// Who stopped.
        from: UserId,
    },
    /// A fire-and-forget in-meeting notification.
    MeetingNotice {
        /// Meeting code.
        code: MeetingCode,
        /// Originating participant.
        from: UserId,
        /// What happened.
        notice: MeetingNotice,
    },
    /// An operation failed; surfaced only to the originating connection.
    Error {
        /// Machine-readable code (error kind).
        code: String,
        /// Human-readable description.
        message: String,
    },
}
