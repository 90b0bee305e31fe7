//! Document infrastructure - Document collection implementations

mod in_memory;

pub use in_memory::InMemoryCollection;
