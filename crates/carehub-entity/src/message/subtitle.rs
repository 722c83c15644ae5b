//! Live subtitle entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::types::id::{MeetingCode, UserId};

use super::translation::Translation;

/// One spoken-caption entry, broadcast to a meeting and appended to its
/// subtitle log. Never targeted at a single receiver and immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtitle {
    /// Meeting the subtitle belongs to.
    pub meeting: MeetingCode,
    /// Who spoke.
    pub speaker: UserId,
    /// Recognized text.
    pub text: String,
    /// BCP-47 tag of the spoken language.
    pub language: String,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f32,
    /// Pre-computed translations.
    pub translations: Vec<Translation>,
    /// When the words were spoken.
    pub spoken_at: DateTime<Utc>,
}

impl Subtitle {
    /// Create a subtitle stamped with the current time.
    pub fn new(
        meeting: MeetingCode,
        speaker: UserId,
        text: impl Into<String>,
        language: impl Into<String>,
        confidence: f32,
        translations: Vec<Translation>,
    ) -> Self {
        Self {
            meeting,
            speaker,
            text: text.into(),
            language: language.into(),
            confidence,
            translations,
            spoken_at: Utc::now(),
        }
    }
}
