use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::provider::{ContentStore, ContentStoreError, WriteReceipt, WriteRequest};
use super::record_set::RecordSet;
use crate::clock::{SharedClock, SystemClock};
use crate::content::Record;

/// In-memory content store, holding records and accepted write tokens
#[derive(Debug, Clone)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<MemoryContentStoreInner>>,
    clock: SharedClock,
}

#[derive(Debug, Default)]
struct MemoryContentStoreInner {
    records: RecordSet,
    /// Accepted tokens and when they stop being accepted
    tokens: HashMap<String, Option<DateTime<Utc>>>,
    /// Number of `fetch_published` calls served
    fetches: usize,
    /// Number of writes committed
    commits: usize,
    /// When set, fetches fail with this message
    fetch_failure: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryContentStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
}

impl MemoryContentStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryContentStoreInner::default())),
            clock,
        }
    }

    pub fn with_records(records: Vec<Record>, clock: SharedClock) -> Self {
        let store = Self::new(clock);
        store.inner.write().records = RecordSet::new(records);
        store
    }

    /// Accept `token` for writes, optionally only until `expires_at`.
    pub fn authorize(&self, token: impl Into<String>, expires_at: Option<DateTime<Utc>>) {
        self.inner.write().tokens.insert(token.into(), expires_at);
    }

    pub fn revoke(&self, token: &str) {
        self.inner.write().tokens.remove(token);
    }

    /// Replace or add a record directly, as another client would.
    pub fn upsert(&self, record: Record) {
        self.inner.write().records.upsert(record);
    }

    pub fn record(&self, path: &str) -> Option<Record> {
        self.inner.read().records.get(path).cloned()
    }

    /// Make subsequent fetches fail (or succeed again with `None`).
    pub fn fail_fetches(&self, message: Option<&str>) {
        self.inner.write().fetch_failure = message.map(str::to_string);
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.read().fetches
    }

    pub fn commit_count(&self) -> usize {
        self.inner.read().commits
    }

    fn token_accepted(&self, inner: &MemoryContentStoreInner, token: &str) -> bool {
        match inner.tokens.get(token) {
            Some(Some(expires_at)) => self.clock.now() < *expires_at,
            Some(None) => true,
            None => false,
        }
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    type Error = MemoryContentStoreError;

    async fn fetch_published(&self) -> Result<Vec<Record>, ContentStoreError<Self::Error>> {
        let mut inner = self.inner.write();
        inner.fetches += 1;
        if let Some(message) = &inner.fetch_failure {
            return Err(ContentStoreError::Provider(MemoryContentStoreError::Internal(
                message.clone(),
            )));
        }
        Ok(inner.records.published())
    }

    async fn submit_write(
        &self,
        request: WriteRequest,
    ) -> Result<WriteReceipt, ContentStoreError<Self::Error>> {
        let mut inner = self.inner.write();
        if !self.token_accepted(&inner, &request.auth_token) {
            return Err(ContentStoreError::Unauthorized);
        }

        let now = self.clock.now();
        let receipt = inner.records.commit(&request, now)?;
        inner.commits += 1;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::{Clock, ManualClock};

    fn store() -> (MemoryContentStore, ManualClock) {
        let clock = ManualClock::fixed();
        let at = clock.now();
        let store = MemoryContentStore::with_records(
            vec![
                Record::directory("/", at),
                Record::file("/a.txt", "a", at),
                Record::file("/draft.txt", "d", at).unpublished(),
            ],
            Arc::new(clock.clone()),
        );
        (store, clock)
    }

    fn write(token: &str, prev: Option<DateTime<Utc>>) -> WriteRequest {
        WriteRequest {
            path: "/a.txt".into(),
            content: "b".into(),
            prev_updated_at: prev,
            force: false,
            allow_create: false,
            auth_token: token.into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_only_published() {
        let (store, _) = store();
        let records = store.fetch_published().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.published));
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let (store, _) = store();
        store.fail_fetches(Some("offline"));
        let err = store.fetch_published().await.unwrap_err();
        assert_eq!(
            err,
            ContentStoreError::Provider(MemoryContentStoreError::Internal("offline".into()))
        );

        store.fail_fetches(None);
        assert!(store.fetch_published().await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let (store, clock) = store();
        let prev = Some(clock.now());
        assert_eq!(
            store.submit_write(write("nope", prev)).await,
            Err(ContentStoreError::Unauthorized)
        );
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_token_expiry_and_revocation() {
        let (store, clock) = store();
        let start = clock.now();
        store.authorize("t", Some(start + chrono::Duration::seconds(60)));

        clock.advance(Duration::from_secs(1));
        let receipt = store.submit_write(write("t", Some(start))).await.unwrap();
        assert_eq!(receipt.updated_at, clock.now());

        clock.advance(Duration::from_secs(60));
        assert_eq!(
            store.submit_write(write("t", Some(receipt.updated_at))).await,
            Err(ContentStoreError::Unauthorized)
        );

        store.authorize("forever", None);
        assert!(store.submit_write(write("forever", Some(receipt.updated_at))).await.is_ok());
        store.revoke("forever");
        assert_eq!(
            store.submit_write(write("forever", None)).await,
            Err(ContentStoreError::Unauthorized)
        );
    }
}
