//! Replay domain - Reconstructs recorded call histories

mod engine;

pub use engine::{Replay, ReplayEngine, ReplayEntry};
