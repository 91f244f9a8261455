//! Backend Error Types
//!
//! The chat subsystem's failure taxonomy. Nothing here is fatal to the
//! process: every error is scoped to the connection attempt or the single
//! event that raised it.

/// Error type definitions
pub mod types;

pub use types::ChatError;
