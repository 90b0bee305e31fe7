//! Document domain - Bulk field updates on a document collection

mod repository;

pub use repository::{matches_filter, update_topics, Document, DocumentCollection};
