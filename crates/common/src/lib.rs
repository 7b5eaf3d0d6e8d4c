/**
 * Injectable wall clock.
 *  Everything that expires reads time through here.
 */
pub mod clock;
/**
 * The filesystem view over remote content.
 *  - Path algebra
 *  - Tree built from flat records
 *  - Read-through cache
 *  - Authorized, conflict-checked writes
 */
pub mod content;
/**
 * Session-scoped write authorization.
 *  A single short-lived token, optionally
 *  mirrored into session storage.
 */
pub mod elevation;
/**
 * The remote content store seam, with an
 *  in-memory implementation and the shared
 *  optimistic-concurrency commit rules.
 */
pub mod remote;

pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
    pub use crate::content::{
        path, ContentFs, FsConfig, FsStats, NodeKind, NodeStat, Record, RefreshError, WriteError,
        WriteOptions, WriteOutcome,
    };
    pub use crate::elevation::{ElevationStore, MemorySessionStorage, SessionStorage};
    pub use crate::remote::{ContentStore, ContentStoreError, MemoryContentStore, RecordSet};
}
