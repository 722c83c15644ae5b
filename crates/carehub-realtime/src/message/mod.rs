//! Wire-level message schema.

pub mod types;

pub use types::{ClientEvent, MeetingNotice, ServerEvent};
