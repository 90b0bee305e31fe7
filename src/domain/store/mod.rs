//! Store domain - Adapter contract for the external key-value store

mod repository;

pub use repository::{effective_ttl, ttl_secs, ValueStore};

#[cfg(test)]
pub use repository::MockValueStore;
