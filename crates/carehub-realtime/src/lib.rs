//! # carehub-realtime
//!
//! Real-time communication core for CareHub. Provides:
//!
//! - A presence registry mapping user identities to live connections
//! - A two-party call coordinator (ringing, accept, reject, teardown)
//! - A store-nothing relay for opaque WebRTC negotiation payloads
//! - An N-party meeting coordinator with host-only controls
//! - Chat and subtitle delivery with durability-before-delivery
//!
//! All shared state is owned by an explicitly constructed
//! [`RealtimeEngine`]; there are no ambient globals, so tests can run
//! isolated engines side by side.

pub mod call;
pub mod chat;
pub mod connection;
pub mod engine;
pub mod message;
pub mod presence;
pub mod room;
pub mod signaling;

pub use call::coordinator::CallCoordinator;
pub use chat::relay::ChatRelay;
pub use connection::pool::ConnectionPool;
pub use engine::RealtimeEngine;
pub use presence::registry::PresenceRegistry;
pub use room::coordinator::RoomCoordinator;
pub use signaling::relay::SignalingRelay;
