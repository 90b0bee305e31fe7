//! Cache key generation strategies

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Trait for generating fresh, unique storage keys
pub trait KeyGenerator: Send + Sync + Debug {
    /// Generates a key never returned before by this generator
    fn generate(&self) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str) -> String {
        format!("{}:{}", namespace, self.generate())
    }
}

/// Random UUID v4 keys; collisions are negligible
#[derive(Debug, Clone, Default)]
pub struct UuidKeyGenerator;

impl UuidKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic keys `<prefix>1`, `<prefix>2`, ...
///
/// Only unique within one generator instance, so it suits tests and
/// throwaway stores rather than shared deployments.
#[derive(Debug)]
pub struct SequentialKeyGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialKeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl KeyGenerator for SequentialKeyGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}
