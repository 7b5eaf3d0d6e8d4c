//! Content tree, read cache and write path
//!
//! This module turns the store's flat record list into a browsable tree:
//!
//! - **[`path`]**: POSIX-style normalization and relative resolution
//! - **[`Record`]**: a remote content item, defaulted and normalized at the
//!   fetch boundary
//! - **[`ContentTree`]**: the path index plus per-directory child listings
//! - **[`ContentCache`]**: a path-keyed read-through cache with a fixed TTL
//! - **[`ContentFs`]**: the façade callers use, tying the tree and cache to
//!   a [`ContentStore`](crate::remote::ContentStore) and an
//!   [`ElevationStore`](crate::elevation::ElevationStore)
//!
//! # Reads
//!
//! Reads never fail: a missing path is `None`, `false`, or an empty
//! listing. Content for a file comes from the cache while fresh and from
//! the resident tree otherwise.
//!
//! # Writes
//!
//! ```text
//! write_file --no token--> Unauthorized
//!     |
//!     +--submit to store--> Unauthorized | Conflict | Validation | Remote
//!     |
//!     +--committed--> patch tree node + cache entry (no refetch)
//! ```
//!
//! There are no retries. On [`WriteError::Conflict`] the caller decides
//! whether to overwrite (`force`), save elsewhere, or give up.

mod cache;
mod fs;
mod maybe_mime;
mod node;
pub mod path;
mod record;
mod tree;
mod write;

pub use cache::{CacheConfig, ContentCache};
pub use fs::{ContentFs, FsConfig, FsStats, RefreshError};
pub use maybe_mime::MaybeMime;
pub use node::{NodeMetadata, NodeStat, TreeNode};
pub use record::{NodeKind, Record};
pub use tree::ContentTree;
pub use write::{WriteError, WriteOptions, WriteOutcome};
