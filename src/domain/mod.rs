//! Domain layer - Core caching, instrumentation and replay logic

pub mod cache;
pub mod document;
pub mod error;
pub mod fetch;
pub mod instrument;
pub mod replay;
pub mod store;

pub use cache::{KeyGenerator, StoredValue, TypedCache};
pub use error::DomainError;
pub use fetch::{ExpiringFetchCache, Fetcher};
pub use instrument::{instrument, InstrumentedCache, Normalize, Operation};
pub use replay::{Replay, ReplayEngine, ReplayEntry};
pub use store::ValueStore;
