//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role tags attached to identities by the hospital backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Doctors, nurses, and other care providers.
    Clinician,
    /// Patients joining consultations.
    Patient,
    /// Hospital administrators.
    Admin,
}

impl UserRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clinician => "clinician",
            Self::Patient => "patient",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = carehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clinician" => Ok(Self::Clinician),
            "patient" => Ok(Self::Patient),
            "admin" => Ok(Self::Admin),
            _ => Err(carehub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: clinician, patient, admin"
            ))),
        }
    }
}
