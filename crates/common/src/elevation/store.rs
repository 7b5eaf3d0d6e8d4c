use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::session::{PersistedToken, SessionStorage};
use crate::clock::SharedClock;

/// Default lifetime of a token installed without an explicit expiry.
pub const DEFAULT_ELEVATION_TTL: Duration = Duration::from_secs(10 * 60);

/// A write-authorization token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ElevationState {
    token: Option<ElevationToken>,
    persist: bool,
}

/**
 * Elevation
 * =========
 * Holds the single active write token. A token is either valid
 *  (`now < expires_at`) or it isn't; expiry is checked on every read,
 *  there is no timer. When persistence is on, the token is mirrored into
 *  session storage so a new store in the same session picks it back up.
 * Storage failures never fail an operation: the in-memory token is the
 *  authority and the mirror is best effort.
 */
#[derive(Debug)]
pub struct ElevationStore {
    state: Mutex<ElevationState>,
    storage: Box<dyn SessionStorage>,
    clock: SharedClock,
    default_ttl: chrono::Duration,
}

impl ElevationStore {
    /// Create a store, restoring a still-valid token from `storage` if one
    ///  was persisted earlier in the session.
    pub fn new(storage: Box<dyn SessionStorage>, clock: SharedClock, default_ttl: Duration) -> Self {
        let store = Self {
            state: Mutex::new(ElevationState::default()),
            storage,
            clock,
            default_ttl: chrono::Duration::from_std(default_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(10)),
        };
        store.restore();
        store
    }

    fn restore(&self) {
        let persisted = match self.storage.load() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("failed to read persisted elevation token: {}", e);
                return;
            }
        };

        let expires_at = DateTime::<Utc>::from_timestamp_millis(persisted.expires_at_ms);
        match expires_at {
            Some(expires_at) if self.clock.now() < expires_at => {
                tracing::debug!("restored elevation token expiring at {}", expires_at);
                let mut state = self.state.lock();
                state.token = Some(ElevationToken {
                    value: persisted.token,
                    expires_at,
                });
                state.persist = true;
            }
            _ => {
                tracing::debug!("discarding expired persisted elevation token");
                self.clear_persisted();
            }
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.current().is_some()
    }

    /// The token value, only while it is valid.
    pub fn token(&self) -> Option<String> {
        self.current().map(|t| t.value)
    }

    /// The full token, only while it is valid.
    pub fn current(&self) -> Option<ElevationToken> {
        let now = self.clock.now();
        self.state
            .lock()
            .token
            .as_ref()
            .filter(|t| now < t.expires_at)
            .cloned()
    }

    /// Install a token. Without `expires_at` it lives for the default TTL.
    pub fn set_token(&self, value: impl Into<String>, expires_at: Option<DateTime<Utc>>) {
        let token = ElevationToken {
            value: value.into(),
            expires_at: expires_at.unwrap_or_else(|| {
                let now = self.clock.now();
                now.checked_add_signed(self.default_ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            }),
        };

        let persist = {
            let mut state = self.state.lock();
            state.token = Some(token.clone());
            state.persist
        };

        if persist {
            self.save_persisted(&token);
        }
    }

    /// Drop the token immediately, along with any persisted copy.
    pub fn clear(&self) {
        self.state.lock().token = None;
        self.clear_persisted();
    }

    /// Toggle mirroring into session storage.
    ///
    /// Turning it on persists the current token right away; turning it
    ///  off erases the persisted copy.
    pub fn set_persist(&self, persist: bool) {
        let token = {
            let mut state = self.state.lock();
            state.persist = persist;
            state.token.clone()
        };

        match (persist, token) {
            (true, Some(token)) => self.save_persisted(&token),
            (true, None) => {}
            (false, _) => self.clear_persisted(),
        }
    }

    pub fn persist(&self) -> bool {
        self.state.lock().persist
    }

    /// Time left on the current token.
    pub fn remaining(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.current()
            .and_then(|t| (t.expires_at - now).to_std().ok())
    }

    fn save_persisted(&self, token: &ElevationToken) {
        let persisted = PersistedToken {
            token: token.value.clone(),
            expires_at_ms: token.expires_at.timestamp_millis(),
        };
        if let Err(e) = self.storage.save(&persisted) {
            tracing::warn!("failed to persist elevation token: {}", e);
        }
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!("failed to clear persisted elevation token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::elevation::MemorySessionStorage;

    fn store_with(storage: &MemorySessionStorage, clock: &ManualClock) -> ElevationStore {
        ElevationStore::new(
            Box::new(storage.clone()),
            Arc::new(clock.clone()),
            DEFAULT_ELEVATION_TTL,
        )
    }

    #[test]
    fn test_set_token_default_expiry() {
        let clock = ManualClock::fixed();
        let store = store_with(&MemorySessionStorage::new(), &clock);
        assert!(!store.is_elevated());
        assert_eq!(store.token(), None);

        store.set_token("secret", None);
        assert!(store.is_elevated());
        assert_eq!(store.token().as_deref(), Some("secret"));
        assert_eq!(store.remaining(), Some(DEFAULT_ELEVATION_TTL));

        clock.advance(DEFAULT_ELEVATION_TTL - Duration::from_millis(1));
        assert!(store.is_elevated());

        clock.advance(Duration::from_millis(1));
        assert!(!store.is_elevated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_huge_default_ttl_saturates() {
        let clock = ManualClock::fixed();
        let store = ElevationStore::new(
            Box::new(MemorySessionStorage::new()),
            Arc::new(clock.clone()),
            Duration::from_secs(u64::MAX / 2000),
        );
        store.set_token("t", None);
        assert!(store.is_elevated());
        assert!(store.current().unwrap().expires_at > clock.now());
    }

    #[test]
    fn test_explicit_expiry_and_clear() {
        let clock = ManualClock::fixed();
        let store = store_with(&MemorySessionStorage::new(), &clock);

        store.set_token("t", Some(clock.now() + chrono::Duration::seconds(5)));
        clock.advance(Duration::from_secs(4));
        assert!(store.is_elevated());

        store.clear();
        assert!(!store.is_elevated());

        // a token already expired on arrival is never valid
        store.set_token("old", Some(clock.now() - chrono::Duration::seconds(1)));
        assert!(!store.is_elevated());
    }

    #[test]
    fn test_persisted_token_restored_in_same_session() {
        let clock = ManualClock::fixed();
        let storage = MemorySessionStorage::new();

        let first = store_with(&storage, &clock);
        first.set_token("kept", None);
        assert!(storage.peek().is_none());

        first.set_persist(true);
        assert_eq!(storage.peek().map(|p| p.token), Some("kept".to_string()));

        clock.advance(Duration::from_secs(60));
        let second = store_with(&storage, &clock);
        assert_eq!(second.token().as_deref(), Some("kept"));
        assert!(second.persist());
    }

    #[test]
    fn test_expired_persisted_token_discarded() {
        let clock = ManualClock::fixed();
        let storage = MemorySessionStorage::new();

        let first = store_with(&storage, &clock);
        first.set_persist(true);
        first.set_token("short", Some(clock.now() + chrono::Duration::seconds(1)));
        assert!(storage.peek().is_some());

        clock.advance(Duration::from_secs(2));
        let second = store_with(&storage, &clock);
        assert!(!second.is_elevated());
        assert!(storage.peek().is_none());
    }

    #[test]
    fn test_persist_off_erases_copy() {
        let clock = ManualClock::fixed();
        let storage = MemorySessionStorage::new();
        let store = store_with(&storage, &clock);

        store.set_persist(true);
        store.set_token("t", None);
        assert!(storage.peek().is_some());

        store.set_persist(false);
        assert!(storage.peek().is_none());
        assert!(store.is_elevated());

        let fresh = store_with(&storage, &clock);
        assert!(!fresh.is_elevated());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let clock = ManualClock::fixed();
        let storage = MemorySessionStorage::new();
        storage.set_available(false);

        let store = store_with(&storage, &clock);
        store.set_persist(true);
        store.set_token("t", None);
        assert!(store.is_elevated());

        store.clear();
        assert!(!store.is_elevated());
    }

    #[test]
    fn test_clear_erases_persisted_copy() {
        let clock = ManualClock::fixed();
        let storage = MemorySessionStorage::new();
        let store = store_with(&storage, &clock);
        store.set_persist(true);
        store.set_token("t", None);

        store.clear();
        assert!(storage.peek().is_none());
    }
}
