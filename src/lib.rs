//! recall-cache
//!
//! A key-value cache over a pluggable store with support for:
//! - Typed values under generated keys
//! - Invocation counting and input/output history per operation
//! - Replay of recorded call histories
//! - An expiring cache in front of slow HTTP fetches

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, InstrumentedCache, ReplayEngine, TypedCache, ValueStore};
