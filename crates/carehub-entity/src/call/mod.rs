//! Two-party call session.

pub mod model;
pub mod state;

pub use model::CallSession;
pub use state::CallState;
