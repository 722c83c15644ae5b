//! Chat and subtitle delivery.

pub mod relay;

pub use relay::ChatRelay;
