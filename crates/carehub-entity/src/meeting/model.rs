//! Meeting aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::types::id::{MeetingCode, UserId};
use carehub_core::{AppError, AppResult};

use crate::identity::Identity;

use super::participant::{Participant, ParticipantRole};
use super::settings::MeetingSettings;
use super::status::{MeetingStatus, RecordingStatus};

/// Outcome of admitting an identity into a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// First join: a fresh participant record was appended.
    Joined,
    /// The identity had left earlier and was re-admitted.
    Readmitted,
    /// The identity is already an active participant; no change.
    AlreadyActive,
}

/// An N-party room with a shareable join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// Human-shareable join token, globally unique.
    pub code: MeetingCode,
    /// The meeting creator.
    pub host: Identity,
    /// Append-only membership records (audit trail).
    pub participants: Vec<Participant>,
    /// Host-adjustable settings.
    pub settings: MeetingSettings,
    /// Lifecycle status.
    pub status: MeetingStatus,
    /// Recording state.
    pub recording: RecordingStatus,
    /// When the meeting was created.
    pub created_at: DateTime<Utc>,
    /// When the first participant joined.
    pub started_at: Option<DateTime<Utc>>,
    /// When the meeting ended.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Meeting {
    /// Create a scheduled meeting with no participants.
    pub fn scheduled(code: MeetingCode, host: Identity, settings: MeetingSettings) -> Self {
        Self {
            code,
            host,
            participants: Vec::new(),
            settings,
            status: MeetingStatus::Scheduled,
            recording: RecordingStatus::Idle,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Whether `user_id` is the meeting host.
    pub fn is_host(&self, user_id: &UserId) -> bool {
        self.host.user_id == *user_id
    }

    /// All participants currently in the meeting.
    pub fn active_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_active())
    }

    /// Number of participants currently in the meeting.
    pub fn active_count(&self) -> usize {
        self.active_participants().count()
    }

    /// Admit an identity.
    ///
    /// Idempotent: an already-active identity is left untouched. An
    /// identity that left earlier gets its existing record re-armed
    /// rather than a duplicate appended. The first admission transitions
    /// `Scheduled → Active`.
    pub fn admit(&mut self, identity: Identity) -> AppResult<AdmitOutcome> {
        if !self.status.is_joinable() {
            return Err(AppError::conflict(format!(
                "Meeting '{}' is {}",
                self.code, self.status
            )));
        }

        if let Some(max) = self.settings.max_participants {
            let joining_fresh = self
                .participants
                .iter()
                .all(|p| p.identity.user_id != identity.user_id || !p.is_active());
            if joining_fresh && self.active_count() >= max as usize {
                return Err(AppError::conflict(format!(
                    "Meeting '{}' is full ({max} participants)",
                    self.code
                )));
            }
        }

        let outcome = match self
            .participants
            .iter_mut()
            .find(|p| p.identity.user_id == identity.user_id)
        {
            Some(existing) if existing.is_active() => AdmitOutcome::AlreadyActive,
            Some(existing) => {
                existing.left_at = None;
                existing.joined_at = Utc::now();
                AdmitOutcome::Readmitted
            }
            None => {
                let role = if self.is_host(&identity.user_id) {
                    ParticipantRole::Host
                } else {
                    ParticipantRole::Participant
                };
                self.participants.push(Participant::new(identity, role));
                AdmitOutcome::Joined
            }
        };

        if self.status == MeetingStatus::Scheduled {
            self.status = MeetingStatus::Active;
            self.started_at = Some(Utc::now());
        }

        Ok(outcome)
    }

    /// Mark an identity as departed. Returns `false` if it was not an
    /// active participant.
    pub fn depart(&mut self, user_id: &UserId) -> bool {
        match self
            .participants
            .iter_mut()
            .find(|p| p.identity.user_id == *user_id && p.is_active())
        {
            Some(p) => {
                p.left_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// End the meeting.
    pub fn end(&mut self) {
        let now = Utc::now();
        for p in self.participants.iter_mut().filter(|p| p.is_active()) {
            p.left_at = Some(now);
        }
        self.status = MeetingStatus::Ended;
        self.ended_at = Some(now);
    }
}
