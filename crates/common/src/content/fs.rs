use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::cache::{CacheConfig, ContentCache};
use super::node::{NodeMetadata, NodeStat};
use super::path;
use super::tree::ContentTree;
use crate::clock::SharedClock;
use crate::elevation::{ElevationStore, DEFAULT_ELEVATION_TTL};
use crate::remote::ContentStore;

/// Tunables for a [`ContentFs`].
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub elevation_ttl: Duration,
}

impl Default for FsConfig {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            cache_ttl: cache.ttl,
            cache_max_entries: cache.max_entries,
            elevation_ttl: DEFAULT_ELEVATION_TTL,
        }
    }
}

impl FsConfig {
    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            max_entries: self.cache_max_entries,
        }
    }
}

/// Counts describing the loaded tree and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub total_items: usize,
    pub directories: usize,
    pub files: usize,
    pub cache_size: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to fetch records: {0}")]
    Fetch(anyhow::Error),
}

pub(crate) struct ContentFsInner<S> {
    pub(crate) store: S,
    pub(crate) tree: RwLock<ContentTree>,
    pub(crate) cache: ContentCache,
    pub(crate) elevation: Arc<ElevationStore>,
    pub(crate) clock: SharedClock,
}

/// A remote, flat record collection presented as a hierarchical filesystem.
///
/// Cloning is cheap and clones share state.
pub struct ContentFs<S>(pub(crate) Arc<ContentFsInner<S>>);

impl<S> Clone for ContentFs<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: ContentStore> std::fmt::Debug for ContentFs<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFs")
            .field("store", &self.0.store)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<S: ContentStore> ContentFs<S> {
    /// Create a filesystem with an empty tree. Call [`refresh`](Self::refresh)
    ///  to load it.
    pub fn new(
        store: S,
        elevation: Arc<ElevationStore>,
        config: FsConfig,
        clock: SharedClock,
    ) -> Self {
        let tree = ContentTree::build(Vec::new(), clock.now());
        Self(Arc::new(ContentFsInner {
            store,
            tree: RwLock::new(tree),
            cache: ContentCache::new(config.cache(), clock.clone()),
            elevation,
            clock,
        }))
    }

    /// Create a filesystem and load it from the store.
    pub async fn load(
        store: S,
        elevation: Arc<ElevationStore>,
        config: FsConfig,
        clock: SharedClock,
    ) -> Result<Self, RefreshError> {
        let fs = Self::new(store, elevation, config, clock);
        fs.refresh().await?;
        Ok(fs)
    }

    pub fn store(&self) -> &S {
        &self.0.store
    }

    pub fn elevation(&self) -> &Arc<ElevationStore> {
        &self.0.elevation
    }

    /// Rebuild the tree from the store and drop the cache.
    ///
    /// The new tree is built completely before it replaces the old one;
    ///  if the fetch fails the previous tree and cache stay in place.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let records = match self.0.store.fetch_published().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("refresh failed, keeping previous tree: {}", e);
                return Err(RefreshError::Fetch(e.into()));
            }
        };

        let record_count = records.len();
        let tree = ContentTree::build(records, self.0.clock.now());
        tracing::info!(
            "loaded {} records: {} directories, {} files",
            record_count,
            tree.directory_count(),
            tree.file_count()
        );

        let mut current = self.0.tree.write();
        *current = tree;
        self.0.cache.clear();
        Ok(())
    }

    pub fn normalize_path(&self, path: &str) -> String {
        path::normalize(path)
    }

    pub fn resolve_path(&self, current: &str, target: &str) -> String {
        path::resolve(current, target)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.0.tree.read().exists(&path::normalize(path))
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.0.tree.read().is_dir(&path::normalize(path))
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.0.tree.read().is_file(&path::normalize(path))
    }

    /// Child names of a directory, sorted. Empty for files and missing paths.
    pub fn children(&self, path: &str) -> Vec<String> {
        self.0.tree.read().children(&path::normalize(path)).to_vec()
    }

    pub fn metadata(&self, path: &str) -> Option<NodeMetadata> {
        self.0.tree.read().metadata(&path::normalize(path))
    }

    pub fn stat(&self, path: &str) -> Option<NodeStat> {
        self.0.tree.read().stat(&path::normalize(path))
    }

    pub fn ls(&self, path: &str) -> Vec<NodeStat> {
        self.0.tree.read().ls(&path::normalize(path))
    }

    pub fn walk(&self, path: &str) -> Vec<String> {
        self.0.tree.read().walk(&path::normalize(path))
    }

    /// Content of a file.
    ///
    /// `None` when the path is missing or is a directory. Fresh cache
    ///  entries are served as-is; otherwise the content comes from the
    ///  resident tree and is cached.
    pub fn content(&self, path: &str) -> Option<String> {
        let path = path::normalize(path);
        let tree = self.0.tree.read();
        let node = tree.get(&path).filter(|n| n.is_file())?;

        if let Some(content) = self.0.cache.get(&path) {
            tracing::debug!("cache hit: {}", path);
            return Some(content);
        }

        tracing::debug!("cache miss: {}", path);
        let content = node.content.clone().unwrap_or_default();
        self.0.cache.put(&path, content.clone());
        Some(content)
    }

    pub fn clear_cache(&self) {
        self.0.cache.clear();
    }

    pub fn invalidate(&self, path: &str) {
        self.0.cache.invalidate(&path::normalize(path));
    }

    pub fn stats(&self) -> FsStats {
        let tree = self.0.tree.read();
        FsStats {
            total_items: tree.len(),
            directories: tree.directory_count(),
            files: tree.file_count(),
            cache_size: self.0.cache.len(),
            cache_hits: self.0.cache.hits(),
            cache_misses: self.0.cache.misses(),
        }
    }
}
