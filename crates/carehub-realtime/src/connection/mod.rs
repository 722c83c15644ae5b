//! Connection lifecycle: per-socket handles, the pool, and token
//! authentication.

pub mod authenticator;
pub mod handle;
pub mod pool;

pub use authenticator::TokenAuthenticator;
pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;
