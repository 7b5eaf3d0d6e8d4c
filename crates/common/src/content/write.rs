use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::fs::{ContentFs, ContentFsInner};
use super::path;
use crate::remote::{ContentStore, ContentStoreError, WriteRequest};

/// Caller-controlled knobs for a single write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// The `updated_at` the caller believes is current. Defaults to the
    ///  locally loaded node's `updated_at`.
    pub expected_updated_at: Option<DateTime<Utc>>,
    /// Overwrite even if someone else wrote in the meantime
    pub force: bool,
    /// Create the file if it doesn't exist
    pub allow_create: bool,
}

impl WriteOptions {
    pub fn create() -> Self {
        Self {
            allow_create: true,
            ..Self::default()
        }
    }

    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn expecting(updated_at: DateTime<Utc>) -> Self {
        Self {
            expected_updated_at: Some(updated_at),
            ..Self::default()
        }
    }
}

/// A committed write, as now reflected in the local tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: String,
    pub updated_at: DateTime<Utc>,
    pub created: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// No valid elevation token, or the store rejected it
    #[error("not authorized to write; elevate and retry")]
    Unauthorized,
    /// Someone else changed the file since it was read
    #[error("conflict writing {path}: expected version {expected:?}, store has {actual:?}")]
    Conflict {
        path: String,
        expected: Option<DateTime<Utc>>,
        actual: Option<DateTime<Utc>>,
    },
    /// The write doesn't make sense for the target path
    #[error("invalid write: {0}")]
    Validation(String),
    /// The store failed for a reason unrelated to the write protocol
    #[error("remote store error: {0}")]
    Remote(#[from] anyhow::Error),
}

impl WriteError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, WriteError::Conflict { .. })
    }
}

impl<E> From<ContentStoreError<E>> for WriteError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: ContentStoreError<E>) -> Self {
        match e {
            ContentStoreError::Provider(e) => WriteError::Remote(e.into()),
            ContentStoreError::Unauthorized => WriteError::Unauthorized,
            ContentStoreError::Conflict {
                path,
                expected,
                actual,
            } => WriteError::Conflict {
                path,
                expected,
                actual,
            },
            ContentStoreError::NotFound(path) => {
                WriteError::Validation(format!("{} does not exist and creation was not allowed", path))
            }
            ContentStoreError::InvalidParent(path) => {
                WriteError::Validation(format!("parent of {} is not a directory", path))
            }
            ContentStoreError::IsDirectory(path) => {
                WriteError::Validation(format!("{} is a directory", path))
            }
        }
    }
}

impl<S: ContentStore> ContentFs<S> {
    /// Write a file through the store, then reflect it locally.
    ///
    /// Requires a valid elevation token. The store decides whether the
    ///  write lost a race; on success the tree and cache are patched in
    ///  place so the new content is readable without another fetch. On any
    ///  failure nothing local changes.
    ///
    /// Once submitted, a write runs to completion even if the returned
    ///  future is dropped.
    pub async fn write_file(
        &self,
        path: &str,
        content: impl Into<String>,
        options: WriteOptions,
    ) -> Result<WriteOutcome, WriteError> {
        let path = path::normalize(path);
        let auth_token = self.0.elevation.token().ok_or(WriteError::Unauthorized)?;

        let prev_updated_at = {
            let tree = self.0.tree.read();
            if tree.is_dir(&path) {
                return Err(WriteError::Validation(format!("{} is a directory", path)));
            }
            if let Some(parent) = path::parent(&path) {
                if tree.is_file(&parent) {
                    return Err(WriteError::Validation(format!(
                        "parent of {} is not a directory",
                        path
                    )));
                }
            }
            options
                .expected_updated_at
                .or_else(|| tree.get(&path).map(|node| node.updated_at))
        };

        let request = WriteRequest {
            path,
            content: content.into(),
            prev_updated_at,
            force: options.force,
            allow_create: options.allow_create,
            auth_token,
        };

        let inner = self.0.clone();
        tokio::spawn(commit(inner, request))
            .await
            .map_err(|e| WriteError::Remote(e.into()))?
    }
}

async fn commit<S: ContentStore>(
    inner: Arc<ContentFsInner<S>>,
    request: WriteRequest,
) -> Result<WriteOutcome, WriteError> {
    let path = request.path.clone();
    let content = request.content.clone();

    let receipt = match inner.store.submit_write(request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            let e = WriteError::from(e);
            tracing::warn!("write to {} rejected: {}", path, e);
            return Err(e);
        }
    };

    {
        let mut tree = inner.tree.write();
        tree.upsert_file(&path, content.clone(), receipt.updated_at, None);
        inner.cache.put(&path, content);
    }

    tracing::info!(
        "committed {} ({}) at {}",
        path,
        if receipt.created { "created" } else { "updated" },
        receipt.updated_at
    );

    Ok(WriteOutcome {
        path,
        updated_at: receipt.updated_at,
        created: receipt.created,
    })
}
