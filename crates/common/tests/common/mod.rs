//! Shared test utilities for content filesystem integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use common::clock::{Clock, ManualClock};
use common::content::{ContentFs, FsConfig, Record};
use common::elevation::{ElevationStore, MemorySessionStorage, DEFAULT_ELEVATION_TTL};
use common::remote::MemoryContentStore;

pub const TOKEN: &str = "test-token";

pub struct TestEnv {
    pub fs: ContentFs<MemoryContentStore>,
    pub store: MemoryContentStore,
    pub clock: ManualClock,
    pub session: MemorySessionStorage,
}

impl TestEnv {
    /// Install a token both locally and on the store.
    pub fn elevate(&self) {
        self.store.authorize(TOKEN, None);
        self.fs.elevation().set_token(TOKEN, None);
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// The records every test starts from.
///
/// `/orphan/lost.txt` names a parent that doesn't exist.
pub fn seed_records(clock: &ManualClock) -> Vec<Record> {
    let at = clock.now();
    vec![
        Record::directory("/", at),
        Record::directory("/docs", at).with_sort_order(1),
        Record::file("/docs/guide.md", "# Guide", at).with_sort_order(2),
        Record::file("/docs/api.md", "# API", at).with_sort_order(3),
        Record::file("/readme.txt", "hello", at).with_sort_order(4),
        Record::file("/orphan/lost.txt", "nobody lists me", at),
        Record::file("/draft.txt", "unpublished", at).unpublished(),
    ]
}

/// Set up a loaded filesystem over an in-memory store and a manual clock
pub async fn setup_test_env() -> TestEnv {
    let clock = ManualClock::fixed();
    let store = MemoryContentStore::with_records(seed_records(&clock), Arc::new(clock.clone()));
    let session = MemorySessionStorage::new();

    let elevation = Arc::new(ElevationStore::new(
        Box::new(session.clone()),
        Arc::new(clock.clone()),
        DEFAULT_ELEVATION_TTL,
    ));

    let fs = ContentFs::load(
        store.clone(),
        elevation,
        FsConfig::default(),
        Arc::new(clock.clone()),
    )
    .await
    .unwrap();

    TestEnv {
        fs,
        store,
        clock,
        session,
    }
}
