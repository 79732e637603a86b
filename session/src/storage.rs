//! Persistent key/value storage for the session.
//!
//! Modeled on browser local storage: string keys, string values, survives
//! restarts. The file-backed implementation keeps every key in a single
//! JSON object.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::SessionError;

/// Key holding the serialized [`ballot_types::User`].
pub const SESSION_USER_KEY: &str = "session_user";
/// Key holding the bearer token returned by login.
pub const SESSION_TOKEN_KEY: &str = "session_token";

/// String key/value store that outlives the process.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// [`SessionStorage`] backed by a JSON file.
///
/// The file is read on every access and rewritten on every change, so two
/// clients sharing a file see each other's writes. A missing file reads as
/// empty.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(SessionError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&json)
            .map_err(|e| SessionError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(SessionError::Storage(
                    format!("failed to remove {}: {e}", self.path.display()),
                )),
                _ => Ok(()),
            };
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| SessionError::Storage(format!("JSON serialization failed: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            SessionError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(SessionError::Corrupt(_)) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        match self.load() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.save(&entries)
                } else {
                    Ok(())
                }
            }
            // A corrupt file is discarded wholesale.
            Err(SessionError::Corrupt(_)) => self.save(&BTreeMap::new()),
            Err(e) => Err(e),
        }
    }
}
