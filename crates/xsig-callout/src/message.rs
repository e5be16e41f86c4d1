#![forbid(unsafe_code)]

//! The request-scoped variable store.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Named string variables shared between the host and a callout.
///
/// Writes go through `&self`, so a store can be read by a
/// [`PropertyResolver`](crate::PropertyResolver) and written by the
/// reporter during the same invocation.
pub trait VariableStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: String);
}

/// A [`VariableStore`] held in memory, used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vars: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value.into());
        self
    }

    /// A copy of every variable, in name order.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VariableStore for MemoryStore {
    fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    fn set(&self, name: &str, value: String) {
        self.lock().insert(name.to_owned(), value);
    }
}
