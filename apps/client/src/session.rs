//! Session Store: the authenticated identity and bearer credential.
//!
//! Holds at most one `(User, Credential)` pair. The pair is persisted under two
//! fixed keys so a restarted process picks it up again. A persisted identity
//! that no longer parses is discarded and the store starts logged out; restore
//! never fails the process.
//!
//! The store is created explicitly with [`SessionStore::init`] and handed to the
//! components that need it. There is no global instance.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use crate::errors::ClientError;
use crate::models::User;

/// Storage key of the serialized identity.
pub const USER_KEY: &str = "user";
/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "accessToken";

/// Bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// The authenticated pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub credential: Credential,
}

// ────────────────────────────────────────────────────────────────────────────
// Durable storage
// ────────────────────────────────────────────────────────────────────────────

/// Durable key/value storage backing the session.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key inside a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local storage for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    current: Option<Session>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Restores a previously persisted session, or starts logged out.
    pub fn init(storage: S) -> Self {
        let current = restore(&storage);
        match &current {
            Some(session) => info!("Restored session for {}", session.user.email),
            None => info!("No stored session; starting logged out"),
        }
        Self { storage, current }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces any existing pair and persists the new one.
    pub fn login(&mut self, user: User, credential: Credential) -> Result<&Session, ClientError> {
        if credential.is_empty() {
            return Err(ClientError::Auth("Sign-in returned an empty access token".into()));
        }
        let serialized = serde_json::to_string(&user)?;

        // The old pair is gone before the new one is written, and a user entry
        // never outlives a failed token write.
        self.current = None;
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.set(USER_KEY, &serialized)?;
        if let Err(e) = self.storage.set(TOKEN_KEY, credential.as_str()) {
            warn!("Could not persist access token for {}: {e}", user.email);
            if let Err(cleanup) = self.storage.remove(USER_KEY) {
                warn!("Could not remove half-written user entry: {cleanup}");
            }
            return Err(e.into());
        }

        info!("Signed in as {} ({})", user.email, user.role().as_str());
        Ok(self.current.insert(Session { user, credential }))
    }

    /// Clears the in-memory pair first, then both durable entries.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        if let Some(session) = self.current.take() {
            info!("Signed out {}", session.user.email);
        }
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn restore<S: SessionStorage>(storage: &S) -> Option<Session> {
    let stored_user = read_entry(storage, USER_KEY)?;
    let stored_token = read_entry(storage, TOKEN_KEY)?;

    match serde_json::from_str::<User>(&stored_user) {
        Ok(user) => Some(Session {
            user,
            credential: Credential::new(stored_token),
        }),
        Err(e) => {
            warn!("Failed to parse stored user, discarding it: {e}");
            if let Err(e) = storage.remove(USER_KEY) {
                warn!("Could not remove corrupted user entry: {e}");
            }
            None
        }
    }
}

/// Blank and unreadable entries count as absent.
fn read_entry<S: SessionStorage>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(Some(value)) if !value.trim().is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            warn!("Could not read stored '{key}': {e}");
            None
        }
    }
}
