//! The remote content store seam
//!
//! The store is the source of truth: it serves the published record set
//! that trees are built from, and it is the sole judge of whether a write
//! is authorized and whether it lost an optimistic-concurrency race.
//! [`RecordSet`] holds the commit rules so every store enforces the same
//! protocol.

mod memory;
mod provider;
mod record_set;

pub use memory::{MemoryContentStore, MemoryContentStoreError};
pub use provider::{ContentStore, ContentStoreError, WriteReceipt, WriteRequest};
pub use record_set::RecordSet;
