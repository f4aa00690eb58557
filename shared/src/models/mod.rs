//! Data models
//!
//! Shared between the server and the client SDK (via API).
//! Wire format is camelCase JSON; timestamps are Unix millis.

pub mod identity;
pub mod role;

// Re-exports
pub use identity::*;
pub use role::*;
