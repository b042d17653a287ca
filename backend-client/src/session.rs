//! Bearer token storage.
//!
//! The client never touches storage directly; it goes through a
//! [`Session`], which reads, writes and removes one key of an injected
//! [`SessionStore`].

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{BackendError, Result};

/// String key-value storage for session data.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// JSON object on disk, written with mode 0600 on Unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.storage_error(e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| self.storage_error(e))
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }

        #[cfg(unix)]
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .map_err(|e| self.storage_error(e))?;

        #[cfg(not(unix))]
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.storage_error(e))?;

        let json = serde_json::to_string_pretty(values).map_err(|e| self.storage_error(e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.storage_error(e))?;
        Ok(())
    }

    fn storage_error(&self, err: impl std::fmt::Display) -> BackendError {
        BackendError::Storage(format!("{}: {err}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Handle to the bearer token.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    key: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("key", &self.key).finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// A session kept in memory only, under the default key.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), "access_token")
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.store.get(&self.key)?.filter(|t| !t.is_empty()))
    }

    pub fn store_token(&self, token: &str) -> Result<()> {
        self.store.set(&self.key, token)?;
        tracing::info!(key = %self.key, "session token stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        tracing::info!(key = %self.key, "session token removed");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_round_trips_through_memory() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());

        session.store_token("tok").unwrap();
        assert_eq!(session.token().ok().flatten().as_deref(), Some("tok"));

        session.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        store.set("access_token", "tok").unwrap();
        store.set("other", "keep").unwrap();
        store.remove("access_token").unwrap();

        let reopened = FileSessionStore::new(store.path());
        assert_eq!(reopened.get("access_token").ok().flatten(), None);
        assert_eq!(reopened.get("other").ok().flatten().as_deref(), Some("keep"));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set("access_token", "tok").unwrap();

        let mode = fs::metadata(store.path())
            .map(|m| m.permissions().mode() & 0o777)
            .unwrap();
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.get("access_token"), Err(BackendError::Storage(_))));
    }
}
