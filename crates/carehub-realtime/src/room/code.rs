//! Meeting code generation.
//!
//! Codes are human-shareable tokens of three hyphen-separated lowercase
//! alphanumeric groups, e.g. `k3f-9qx2-ab7`. Generation is random;
//! global uniqueness is enforced by the coordinator, which checks the
//! meeting store and retries on collision.

use rand::distr::Alphanumeric;
use rand::RngExt;

use carehub_core::types::id::MeetingCode;

/// Lengths of the three code groups.
const GROUP_LENGTHS: [usize; 3] = [3, 4, 3];

/// Generate a random meeting code.
pub fn generate() -> MeetingCode {
    let mut rng = rand::rng();
    let groups: Vec<String> = GROUP_LENGTHS
        .iter()
        .map(|&len| {
            (0..len)
                .map(|_| rng.sample(Alphanumeric) as char)
                .collect::<String>()
                .to_lowercase()
        })
        .collect();
    MeetingCode::new(groups.join("-"))
}

/// Whether a string has the shape of a meeting code.
pub fn is_well_formed(code: &str) -> bool {
    let groups: Vec<&str> = code.split('-').collect();
    groups.len() == GROUP_LENGTHS.len()
        && groups.iter().zip(GROUP_LENGTHS).all(|(group, len)| {
            group.len() == len
                && group
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}
