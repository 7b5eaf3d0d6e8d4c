use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Key the token value is stored under.
pub const TOKEN_KEY: &str = "elevation_token";
/// Key the token's expiry (epoch milliseconds) is stored under.
pub const EXPIRES_AT_KEY: &str = "elevation_expires_at";

/// The persisted mirror of an elevation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedToken {
    #[serde(rename = "elevation_token")]
    pub token: String,
    #[serde(rename = "elevation_expires_at")]
    pub expires_at_ms: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session data: {0}")]
    Malformed(String),
}

/// Session-scoped key/value storage for the elevation token.
///
/// Implementations may fail freely; callers treat persistence as best
/// effort.
pub trait SessionStorage: Send + Sync + Debug {
    fn load(&self) -> Result<Option<PersistedToken>, SessionStorageError>;
    fn save(&self, token: &PersistedToken) -> Result<(), SessionStorageError>;
    fn clear(&self) -> Result<(), SessionStorageError>;
}

/// Storage that lives as long as the process, shared between clones.
#[derive(Debug, Clone)]
pub struct MemorySessionStorage {
    slot: Arc<Mutex<Option<PersistedToken>>>,
    available: Arc<AtomicBool>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate storage going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// What is currently stored, bypassing availability.
    pub fn peek(&self) -> Option<PersistedToken> {
        self.slot.lock().clone()
    }

    fn check(&self) -> Result<(), SessionStorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SessionStorageError::Unavailable("storage disabled".into()))
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedToken>, SessionStorageError> {
        self.check()?;
        Ok(self.slot.lock().clone())
    }

    fn save(&self, token: &PersistedToken) -> Result<(), SessionStorageError> {
        self.check()?;
        *self.slot.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        self.check()?;
        *self.slot.lock() = None;
        Ok(())
    }
}
