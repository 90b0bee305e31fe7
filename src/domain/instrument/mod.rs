//! Instrumentation domain - Invocation counting and call history

mod cache;
mod normalize;
mod operation;

pub use cache::{InstrumentedCache, StoreOperation, STORE_IDENTITY};
pub use normalize::Normalize;
pub use operation::{
    error_marker, inputs_key, instrument, outputs_key, Counted, Operation, Recorded,
};
