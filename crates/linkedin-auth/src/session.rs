//! Per-user session storage used for the CSRF state
//!
//! The web framework owns the session; the auth client only needs to set,
//! read and take one key. `MemorySession` backs tests and simple
//! single-process deployments.

use std::collections::HashMap;

/// Key-value store scoped to one user session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, overwriting any previous value for the key.
    fn set(&mut self, key: &str, value: String);

    /// Remove and return a value.
    fn remove(&mut self, key: &str) -> Option<String>;
}

/// In-memory session backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}
