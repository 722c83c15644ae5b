//! Room coordinator — N-party meetings on top of the presence registry.
//!
//! Live meetings are held in an in-process map; the meeting store
//! collaborator provides durability and the uniqueness check for code
//! generation. Broadcasts resolve each recipient through the presence
//! registry at send time — the coordinator never keeps connection
//! handles.
//!
//! Mutations happen under the per-meeting map guard, which is dropped
//! before any store await or broadcast.

use std::sync::Arc;

use dashmap::DashMap;

use carehub_core::config::realtime::RealtimeConfig;
use carehub_core::types::id::{MeetingCode, UserId};
use carehub_core::{AppError, AppResult};
use carehub_entity::identity::Identity;
use carehub_entity::meeting::{AdmitOutcome, Meeting, MeetingSettings, RecordingStatus};
use carehub_store::MeetingStore;

use crate::message::types::{MeetingNotice, ServerEvent};
use crate::presence::registry::PresenceRegistry;

use super::code;

/// Coordinates meeting membership, host controls, and broadcasts.
pub struct RoomCoordinator {
    presence: Arc<PresenceRegistry>,
    store: Arc<dyn MeetingStore>,
    meetings: DashMap<MeetingCode, Meeting>,
    code_attempts: u32,
}

impl std::fmt::Debug for RoomCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomCoordinator")
            .field("live_meetings", &self.meetings.len())
            .finish()
    }
}

impl RoomCoordinator {
    /// Creates a coordinator.
    pub fn new(
        presence: Arc<PresenceRegistry>,
        store: Arc<dyn MeetingStore>,
        config: &RealtimeConfig,
    ) -> Self {
        Self {
            presence,
            store,
            meetings: DashMap::new(),
            code_attempts: config.meeting_code_attempts,
        }
    }

    /// Create a meeting with a freshly generated unique code.
    ///
    /// The code is checked against the meeting store and the live table;
    /// generation retries on collision up to the configured attempt
    /// budget before giving up with a conflict.
    pub async fn create(&self, host: Identity, settings: MeetingSettings) -> AppResult<Meeting> {
        for _ in 0..self.code_attempts {
            let candidate = code::generate();
            if self.meetings.contains_key(&candidate)
                || self.store.fetch(&candidate).await?.is_some()
            {
                tracing::debug!(code = %candidate, "Meeting code collision, retrying");
                continue;
            }

            let meeting = Meeting::scheduled(candidate.clone(), host.clone(), settings.clone());
            self.store.insert(&meeting).await?;
            self.meetings.insert(candidate, meeting.clone());
            tracing::info!(code = %meeting.code, host = %meeting.host.user_id, "Meeting created");
            return Ok(meeting);
        }

        Err(AppError::conflict(
            "Could not generate a unique meeting code",
        ))
    }

    /// Join a meeting, returning a snapshot of the *other* current
    /// participants (no guaranteed order).
    ///
    /// Idempotent: a second join from an active participant returns the
    /// snapshot again without a duplicate record or broadcast.
    pub async fn join(&self, joiner: Identity, meeting_code: &MeetingCode) -> AppResult<Vec<Identity>> {
        self.ensure_live(meeting_code).await?;

        let (outcome, others, snapshot) = {
            let mut meeting = self
                .meetings
                .get_mut(meeting_code)
                .ok_or_else(|| AppError::not_found(format!("Meeting '{meeting_code}' not found")))?;
            let outcome = meeting.admit(joiner.clone())?;
            let others: Vec<Identity> = meeting
                .active_participants()
                .filter(|p| p.identity.user_id != joiner.user_id)
                .map(|p| p.identity.clone())
                .collect();
            (outcome, others, meeting.clone())
        };

        self.store.update(&snapshot).await?;

        if matches!(outcome, AdmitOutcome::Joined | AdmitOutcome::Readmitted) {
            tracing::info!(code = %meeting_code, user = %joiner.user_id, "Participant joined");
            self.broadcast(
                &others,
                &ServerEvent::UserJoined {
                    code: meeting_code.clone(),
                    identity: joiner,
                },
            );
        }

        Ok(others)
    }

    /// Leave a meeting. Leaving one you are not in is a no-op. The last
    /// active participant leaving implies the meeting has ended.
    pub async fn leave(&self, user_id: &UserId, meeting_code: &MeetingCode) -> AppResult<()> {
        let result = {
            let mut meeting = match self.meetings.get_mut(meeting_code) {
                Some(m) => m,
                None => return Ok(()),
            };
            if !meeting.depart(user_id) {
                return Ok(());
            }
            let remaining: Vec<Identity> = meeting
                .active_participants()
                .map(|p| p.identity.clone())
                .collect();
            let ended = remaining.is_empty();
            if ended {
                meeting.end();
            }
            (remaining, ended, meeting.clone())
        };
        let (remaining, ended, snapshot) = result;

        if ended {
            self.meetings.remove(meeting_code);
            tracing::info!(code = %meeting_code, "Meeting ended (all participants left)");
        }
        self.store.update(&snapshot).await?;

        self.broadcast(
            &remaining,
            &ServerEvent::UserLeft {
                code: meeting_code.clone(),
                user_id: user_id.clone(),
            },
        );
        Ok(())
    }

    /// End a meeting. Host only.
    pub async fn end(&self, requester: &UserId, meeting_code: &MeetingCode) -> AppResult<()> {
        let (targets, snapshot) = {
            let mut meeting = self.require_live(meeting_code)?;
            Self::require_host(&meeting, requester)?;
            let targets: Vec<Identity> = meeting
                .active_participants()
                .map(|p| p.identity.clone())
                .collect();
            meeting.end();
            (targets, meeting.clone())
        };

        self.meetings.remove(meeting_code);
        self.store.update(&snapshot).await?;

        tracing::info!(code = %meeting_code, "Meeting ended by host");
        self.broadcast(
            &targets,
            &ServerEvent::MeetingEnded {
                code: meeting_code.clone(),
            },
        );
        Ok(())
    }

    /// Start or stop recording. Host only.
    pub async fn set_recording(
        &self,
        requester: &UserId,
        meeting_code: &MeetingCode,
        status: RecordingStatus,
    ) -> AppResult<()> {
        let (targets, snapshot) = {
            let mut meeting = self.require_live(meeting_code)?;
            Self::require_host(&meeting, requester)?;
            meeting.recording = status;
            let targets: Vec<Identity> = meeting
                .active_participants()
                .map(|p| p.identity.clone())
                .collect();
            (targets, meeting.clone())
        };

        self.store.update(&snapshot).await?;
        self.broadcast(
            &targets,
            &ServerEvent::RecordingStatus {
                code: meeting_code.clone(),
                status,
            },
        );
        Ok(())
    }

    /// Remove a participant. Host only; the host cannot remove
    /// themselves (they end the meeting instead).
    pub async fn remove_participant(
        &self,
        requester: &UserId,
        meeting_code: &MeetingCode,
        target: &UserId,
    ) -> AppResult<()> {
        let (remaining, snapshot) = {
            let mut meeting = self.require_live(meeting_code)?;
            Self::require_host(&meeting, requester)?;
            if target == requester {
                return Err(AppError::validation(
                    "The host cannot remove themselves; end the meeting instead",
                ));
            }
            if !meeting.depart(target) {
                return Err(AppError::not_found(format!(
                    "'{target}' is not an active participant"
                )));
            }
            let remaining: Vec<Identity> = meeting
                .active_participants()
                .map(|p| p.identity.clone())
                .collect();
            (remaining, meeting.clone())
        };

        self.store.update(&snapshot).await?;

        let event = ServerEvent::ParticipantRemoved {
            code: meeting_code.clone(),
            user_id: target.clone(),
        };
        // The removed participant learns too, then everyone remaining.
        if let Some(conn) = self.presence.resolve(target) {
            conn.send(event.clone());
        }
        self.broadcast(&remaining, &event);
        Ok(())
    }

    /// Replace the meeting settings. Host only.
    pub async fn update_settings(
        &self,
        requester: &UserId,
        meeting_code: &MeetingCode,
        settings: MeetingSettings,
    ) -> AppResult<()> {
        let (targets, snapshot) = {
            let mut meeting = self.require_live(meeting_code)?;
            Self::require_host(&meeting, requester)?;
            meeting.settings = settings.clone();
            let targets: Vec<Identity> = meeting
                .active_participants()
                .map(|p| p.identity.clone())
                .collect();
            (targets, meeting.clone())
        };

        self.store.update(&snapshot).await?;
        self.broadcast(
            &targets,
            &ServerEvent::SettingsUpdated {
                code: meeting_code.clone(),
                settings,
            },
        );
        Ok(())
    }

    /// Rebroadcast a fire-and-forget notification (screen share, raised
    /// hand, mute/camera toggles, virtual background) to the other
    /// participants. Nothing is persisted.
    pub fn notice(
        &self,
        from: &UserId,
        meeting_code: &MeetingCode,
        notice: MeetingNotice,
    ) -> AppResult<()> {
        let others = {
            let meeting = self.require_live(meeting_code)?;
            if !meeting
                .active_participants()
                .any(|p| p.identity.user_id == *from)
            {
                return Err(AppError::validation(format!(
                    "'{from}' is not in meeting '{meeting_code}'"
                )));
            }
            meeting
                .active_participants()
                .filter(|p| p.identity.user_id != *from)
                .map(|p| p.identity.clone())
                .collect::<Vec<_>>()
        };

        self.broadcast(
            &others,
            &ServerEvent::MeetingNotice {
                code: meeting_code.clone(),
                from: from.clone(),
                notice,
            },
        );
        Ok(())
    }

    /// Implicit leave from every live meeting the identity is in.
    pub async fn handle_disconnect(&self, user_id: &UserId) {
        let affected: Vec<MeetingCode> = self
            .meetings
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .active_participants()
                    .any(|p| p.identity.user_id == *user_id)
            })
            .map(|entry| entry.key().clone())
            .collect();

        for meeting_code in affected {
            if let Err(e) = self.leave(user_id, &meeting_code).await {
                tracing::error!(
                    code = %meeting_code,
                    user = %user_id,
                    error = %e,
                    "Implicit leave on disconnect failed"
                );
            }
        }
    }

    /// A snapshot of a live meeting, for callers that need settings or
    /// membership (and for tests).
    pub fn meeting(&self, meeting_code: &MeetingCode) -> Option<Meeting> {
        self.meetings.get(meeting_code).map(|m| m.value().clone())
    }

    /// Identities of everyone currently in a live meeting.
    pub fn active_identities(&self, meeting_code: &MeetingCode) -> AppResult<Vec<Identity>> {
        let meeting = self.require_live(meeting_code)?;
        Ok(meeting
            .active_participants()
            .map(|p| p.identity.clone())
            .collect())
    }

    /// Load a persisted meeting into the live table if it is not there
    /// yet. Ended meetings stay out of the live table.
    async fn ensure_live(&self, meeting_code: &MeetingCode) -> AppResult<()> {
        if self.meetings.contains_key(meeting_code) {
            return Ok(());
        }
        let meeting = self
            .store
            .fetch(meeting_code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meeting '{meeting_code}' not found")))?;
        if !meeting.status.is_joinable() {
            return Err(AppError::conflict(format!(
                "Meeting '{meeting_code}' is {}",
                meeting.status
            )));
        }
        self.meetings.entry(meeting_code.clone()).or_insert(meeting);
        Ok(())
    }

    fn require_live(
        &self,
        meeting_code: &MeetingCode,
    ) -> AppResult<dashmap::mapref::one::RefMut<'_, MeetingCode, Meeting>> {
        self.meetings
            .get_mut(meeting_code)
            .ok_or_else(|| AppError::not_found(format!("Meeting '{meeting_code}' not found")))
    }

    fn require_host(meeting: &Meeting, requester: &UserId) -> AppResult<()> {
        if !meeting.is_host(requester) {
            return Err(AppError::authorization(format!(
                "Only the host may manage meeting '{}'",
                meeting.code
            )));
        }
        Ok(())
    }

    fn broadcast(&self, targets: &[Identity], event: &ServerEvent) {
        for identity in targets {
            if let Some(conn) = self.presence.resolve(&identity.user_id) {
                conn.send(event.clone());
            }
        }
    }
}
