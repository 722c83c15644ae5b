//! # carehub-api
//!
//! HTTP surface for the CareHub real-time core. Exposes the WebSocket
//! upgrade endpoint (`/ws`) and a health check (`/api/health`); the
//! hospital CRUD API lives elsewhere in the backend.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
