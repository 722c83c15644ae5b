//! Pre-computed message translation.

use serde::{Deserialize, Serialize};

/// A translation of a message or subtitle into one language, produced
/// by the client-side translation pipeline and carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// BCP-47 language tag.
    pub language: String,
    /// Translated text.
    pub text: String,
}
