//! Nullable session storage: a shared in-memory map.

use ballot_session::{SessionError, SessionStorage};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// In-memory [`SessionStorage`].
///
/// Clones share the same map, so a test can hand one clone to the code
/// under test and inspect the other. This also simulates a restart: build
/// a fresh gate over a clone and the "persisted" entries are still there.
#[derive(Clone, Debug, Default)]
pub struct NullStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl NullStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if written by an earlier run.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent `set`/`remove` fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Snapshot of all entries (for assertions).
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    fn check_writable(&self) -> Result<(), SessionError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(SessionError::Storage("null storage is read-only".into()));
        }
        Ok(())
    }
}

impl SessionStorage for NullStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
