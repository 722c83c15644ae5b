//! # carehub-entity
//!
//! Domain models for CareHub's real-time communication core: user
//! identities, two-party call sessions, N-party meetings, chat and
//! subtitle messages, and presence snapshots.
//!
//! Entities hold state and enforce their own transition rules; they do
//! not perform I/O.

pub mod call;
pub mod identity;
pub mod meeting;
pub mod message;
pub mod presence;

pub use call::{CallSession, CallState};
pub use identity::{Identity, UserRole};
pub use meeting::{Meeting, MeetingStatus, Participant, ParticipantRole, RecordingStatus};
pub use message::{ChatMessage, ChatScope, Subtitle, Translation};
