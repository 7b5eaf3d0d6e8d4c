use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use common::clock::SharedClock;
use common::content::Record;
use common::remote::{ContentStore, ContentStoreError, RecordSet, WriteReceipt, WriteRequest};

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A content store backed by a single JSON file of records.
///
/// Writes are read-modify-write under a process-wide lock and land via
///  a temp file and rename, so a reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    path: PathBuf,
    write_tokens: Arc<Vec<String>>,
    lock: Arc<tokio::sync::Mutex<()>>,
    clock: SharedClock,
}

impl FileContentStore {
    pub fn new(path: impl Into<PathBuf>, write_tokens: Vec<String>, clock: SharedClock) -> Self {
        Self {
            path: path.into(),
            write_tokens: Arc::new(write_tokens),
            lock: Arc::new(tokio::sync::Mutex::new(())),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<RecordSet, FileStoreError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FileStoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        let records: Vec<Record> =
            serde_json::from_slice(&data).map_err(|source| FileStoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        Ok(RecordSet::new(records))
    }

    async fn write(&self, records: &RecordSet) -> Result<(), FileStoreError> {
        let data = serde_json::to_vec_pretty(records).map_err(|source| FileStoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let io = |source| FileStoreError::Io {
            path: tmp.clone(),
            source,
        };
        tokio::fs::write(&tmp, data).await.map_err(io)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io)?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    type Error = FileStoreError;

    async fn fetch_published(&self) -> Result<Vec<Record>, ContentStoreError<Self::Error>> {
        let records = self.read().await?;
        Ok(records.published())
    }

    async fn submit_write(
        &self,
        request: WriteRequest,
    ) -> Result<WriteReceipt, ContentStoreError<Self::Error>> {
        if !self.write_tokens.iter().any(|t| *t == request.auth_token) {
            return Err(ContentStoreError::Unauthorized);
        }

        let _guard = self.lock.lock().await;
        let mut records = self.read().await?;
        let receipt = records.commit(&request, self.clock.now())?;
        self.write(&records).await?;

        tracing::debug!(
            "committed {} to {} at {}",
            request.path,
            self.path.display(),
            receipt.updated_at
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::clock::{Clock, ManualClock};
    use tempfile::TempDir;

    async fn setup(records: Vec<Record>) -> (TempDir, FileContentStore, ManualClock) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        tokio::fs::write(&path, serde_json::to_vec(&records).unwrap())
            .await
            .unwrap();
        let clock = ManualClock::fixed();
        let store = FileContentStore::new(path, vec!["tok".into()], Arc::new(clock.clone()));
        (dir, store, clock)
    }

    fn request(path: &str, content: &str) -> WriteRequest {
        WriteRequest {
            path: path.into(),
            content: content.into(),
            prev_updated_at: None,
            force: false,
            allow_create: true,
            auth_token: "tok".into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_filters_unpublished() {
        let at = ManualClock::fixed().now();
        let (_dir, store, _) = setup(vec![
            Record::directory("/", at),
            Record::file("/a.txt", "a", at),
            Record::file("/b.txt", "b", at).unpublished(),
        ])
        .await;

        let records = store.fetch_published().await.unwrap();
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/", "/a.txt"]);
    }

    #[tokio::test]
    async fn test_write_persists_and_checks_versions() {
        let at = ManualClock::fixed().now();
        let (_dir, store, clock) = setup(vec![Record::directory("/", at)]).await;

        let created = store.submit_write(request("/new.txt", "one")).await.unwrap();
        assert!(created.created);

        clock.advance(std::time::Duration::from_secs(1));
        let mut stale = request("/new.txt", "two");
        stale.prev_updated_at = Some(at - chrono::Duration::seconds(1));
        assert!(matches!(
            store.submit_write(stale).await,
            Err(ContentStoreError::Conflict { .. })
        ));

        let mut fresh = request("/new.txt", "two");
        fresh.prev_updated_at = Some(created.updated_at);
        let updated = store.submit_write(fresh).await.unwrap();
        assert!(!updated.created);
        assert!(updated.updated_at > created.updated_at);

        // a second handle on the same file sees the committed state
        let reopened = FileContentStore::new(store.path(), vec![], Arc::new(clock.clone()));
        let records = reopened.fetch_published().await.unwrap();
        let file = records.iter().find(|r| r.path == "/new.txt").unwrap();
        assert_eq!(file.content.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let at = ManualClock::fixed().now();
        let (_dir, store, _) = setup(vec![Record::directory("/", at)]).await;
        let mut req = request("/x.txt", "x");
        req.auth_token = "nope".into();
        assert!(matches!(
            store.submit_write(req).await,
            Err(ContentStoreError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_provider_error() {
        let dir = TempDir::new().unwrap();
        let store = FileContentStore::new(
            dir.path().join("absent.json"),
            vec![],
            Arc::new(ManualClock::fixed()),
        );
        assert!(matches!(
            store.fetch_published().await,
            Err(ContentStoreError::Provider(FileStoreError::Io { .. }))
        ));
    }
}
