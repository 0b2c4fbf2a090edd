//! Shared types used across Switchboard crates: configuration, the
//! common error/result alias, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;

pub use config::Config;
pub use error::{Error, Result};
pub use trace::TraceEvent;
