//! In-process storage scope.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use timeclock_core::{KeyValueScope, Result, Scope};

/// A storage scope backed by a map in process memory.
///
/// Used for the session scope of short-lived processes and in tests.
#[derive(Debug)]
pub struct MemoryScope {
    scope: Scope,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryScope {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl KeyValueScope for MemoryScope {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
