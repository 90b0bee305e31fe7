//! Infrastructure layer - External service implementations

pub mod document;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod store;
