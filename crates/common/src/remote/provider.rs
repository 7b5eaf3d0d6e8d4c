use std::fmt::{Debug, Display};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::content::Record;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentStoreError<T> {
    /// Store-level failure unrelated to the write protocol
    #[error("unhandled content store error: {0}")]
    Provider(#[from] T),
    /// The auth token is missing, expired or not accepted by the store
    #[error("write token rejected")]
    Unauthorized,
    /// The record's current `updated_at` doesn't match the caller's
    ///  expectation -- path, expected, actual
    #[error("conflict on {path}: expected {expected:?}, found {actual:?}")]
    Conflict {
        path: String,
        expected: Option<DateTime<Utc>>,
        actual: Option<DateTime<Utc>>,
    },
    /// The target doesn't exist and creation wasn't allowed
    #[error("path not found: {0}")]
    NotFound(String),
    /// The target's parent is missing or isn't a directory
    #[error("parent of {0} is not a directory")]
    InvalidParent(String),
    /// The target is a directory and can't hold content
    #[error("path is a directory: {0}")]
    IsDirectory(String),
}

/// A conflict-checked write submitted to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub path: String,
    pub content: String,
    /// The `updated_at` the caller last saw; `None` for a brand-new file
    pub prev_updated_at: Option<DateTime<Utc>>,
    /// Overwrite regardless of `prev_updated_at`
    pub force: bool,
    /// Create the record if it doesn't exist
    pub allow_create: bool,
    pub auth_token: String,
}

/// What the store reports back for a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    pub updated_at: DateTime<Utc>,
    pub created: bool,
}

#[async_trait]
pub trait ContentStore: Send + Sync + Debug + 'static {
    type Error: std::error::Error + Display + Debug + Send + Sync + 'static;

    /// Fetch every published record, ordered by `sort_order` ascending
    ///
    /// Any error here aborts the refresh that asked for it.
    async fn fetch_published(&self) -> Result<Vec<Record>, ContentStoreError<Self::Error>>;

    /// Atomically apply a write, enforcing the optimistic-concurrency check
    ///
    /// Should fail with the following errors to be considered
    ///  correct:
    /// * `Err(ContentStoreError::Unauthorized)` - the token is not valid
    /// * `Err(ContentStoreError::Conflict)` - `prev_updated_at` is stale and
    ///    `force` is unset
    /// * `Err(ContentStoreError::NotFound)` - the path is missing and
    ///    `allow_create` is unset
    /// * `Err(ContentStoreError::InvalidParent)` - a new file's parent is not
    ///    a directory
    async fn submit_write(
        &self,
        request: WriteRequest,
    ) -> Result<WriteReceipt, ContentStoreError<Self::Error>>;
}
