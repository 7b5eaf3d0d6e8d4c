use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::{ContentStoreError, WriteReceipt, WriteRequest};
use crate::content::{path, NodeKind, Record};

/// The flat record collection a store keeps, plus the commit rules every
/// store implementation shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter().map(Record::validated).collect(),
        }
    }

    /// A set holding only the root directory.
    pub fn with_root(at: DateTime<Utc>) -> Self {
        Self::new(vec![Record::directory(path::ROOT, at)])
    }

    pub fn get(&self, record_path: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.path == record_path)
    }

    /// Insert a record, replacing any record at the same path.
    pub fn upsert(&mut self, record: Record) {
        let record = record.validated();
        match self.records.iter_mut().find(|r| r.path == record.path) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Published records ordered by `sort_order`, ties broken by name.
    pub fn published(&self) -> Vec<Record> {
        let mut out: Vec<Record> = self.records.iter().filter(|r| r.published).cloned().collect();
        out.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| path::name(&a.path).cmp(path::name(&b.path)))
        });
        out
    }

    /// Apply a write under the optimistic-concurrency rules.
    ///
    /// Token validation is the caller's job; this only judges the record
    ///  state. Nothing is mutated unless the write is accepted.
    pub fn commit<E>(
        &mut self,
        request: &WriteRequest,
        now: DateTime<Utc>,
    ) -> Result<WriteReceipt, ContentStoreError<E>> {
        let target = path::normalize(&request.path);

        if let Some(existing) = self.records.iter_mut().find(|r| r.path == target) {
            if existing.kind.is_dir() {
                return Err(ContentStoreError::IsDirectory(target));
            }
            if !request.force && request.prev_updated_at != Some(existing.updated_at) {
                return Err(ContentStoreError::Conflict {
                    path: target,
                    expected: request.prev_updated_at,
                    actual: Some(existing.updated_at),
                });
            }

            let updated_at = next_stamp(now, existing.updated_at);
            existing.content = Some(request.content.clone());
            existing.updated_at = updated_at;
            return Ok(WriteReceipt {
                updated_at,
                created: false,
            });
        }

        if !request.allow_create {
            return Err(ContentStoreError::NotFound(target));
        }
        // the caller expected a record that is gone now
        if !request.force && request.prev_updated_at.is_some() {
            return Err(ContentStoreError::Conflict {
                path: target,
                expected: request.prev_updated_at,
                actual: None,
            });
        }

        let parent = path::parent(&target).unwrap_or_else(|| path::ROOT.to_string());
        let parent_is_dir = match self.get(&parent) {
            Some(record) => record.kind == NodeKind::Directory,
            // the root always exists, even when the set never recorded it
            None => parent == path::ROOT,
        };
        if !parent_is_dir {
            return Err(ContentStoreError::InvalidParent(target));
        }

        self.records
            .push(Record::file(&target, request.content.clone(), now));
        Ok(WriteReceipt {
            updated_at: now,
            created: true,
        })
    }
}

/// Stamps must strictly increase so back-to-back writes stay distinguishable.
fn next_stamp(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + chrono::Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn request(path: &str, prev: Option<DateTime<Utc>>) -> WriteRequest {
        WriteRequest {
            path: path.to_string(),
            content: "new".to_string(),
            prev_updated_at: prev,
            force: false,
            allow_create: false,
            auth_token: "t".to_string(),
        }
    }

    fn set() -> RecordSet {
        RecordSet::new(vec![
            Record::directory("/", at(0)),
            Record::directory("/docs", at(0)),
            Record::file("/docs/a.txt", "a", at(1)),
            Record::file("/hidden.txt", "h", at(1)).unpublished(),
        ])
    }

    #[test]
    fn test_published_filters_and_orders() {
        let mut set = set();
        set.upsert(Record::file("/b.txt", "b", at(0)).with_sort_order(-1));
        let paths: Vec<_> = set.published().into_iter().map(|r| r.path).collect();
        // hidden.txt is unpublished; ties on sort_order fall back to name
        assert_eq!(paths, ["/b.txt", "/", "/docs/a.txt", "/docs"]);
    }

    #[test]
    fn test_update_with_matching_stamp() {
        let mut set = set();
        let receipt = set
            .commit::<Infallible>(&request("/docs/a.txt", Some(at(1))), at(5))
            .unwrap();
        assert_eq!(receipt, WriteReceipt { updated_at: at(5), created: false });
        assert_eq!(set.get("/docs/a.txt").unwrap().content.as_deref(), Some("new"));
    }

    #[test]
    fn test_stale_stamp_conflicts_unless_forced() {
        let mut set = set();
        let stale = request("/docs/a.txt", Some(at(0)));
        let err = set.commit::<Infallible>(&stale, at(5)).unwrap_err();
        assert!(matches!(err, ContentStoreError::Conflict { actual: Some(a), .. } if a == at(1)));
        assert_eq!(set.get("/docs/a.txt").unwrap().content.as_deref(), Some("a"));

        let forced = WriteRequest { force: true, ..stale };
        assert!(set.commit::<Infallible>(&forced, at(5)).is_ok());
    }

    #[test]
    fn test_create_rules() {
        let mut set = set();
        let missing = request("/docs/new.txt", None);
        assert!(matches!(
            set.commit::<Infallible>(&missing, at(5)),
            Err(ContentStoreError::NotFound(_))
        ));

        let create = WriteRequest { allow_create: true, ..missing };
        let receipt = set.commit::<Infallible>(&create, at(5)).unwrap();
        assert!(receipt.created);
        assert_eq!(set.get("/docs/new.txt").unwrap().parent_path.as_deref(), Some("/docs"));

        let under_file = WriteRequest {
            path: "/docs/a.txt/inner.txt".into(),
            ..create.clone()
        };
        assert!(matches!(
            set.commit::<Infallible>(&under_file, at(5)),
            Err(ContentStoreError::InvalidParent(_))
        ));

        let into_dir = WriteRequest { path: "/docs".into(), force: true, ..create };
        assert!(matches!(
            set.commit::<Infallible>(&into_dir, at(5)),
            Err(ContentStoreError::IsDirectory(_))
        ));
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let mut set = set();
        let first = set
            .commit::<Infallible>(&request("/docs/a.txt", Some(at(1))), at(1))
            .unwrap();
        assert!(first.updated_at > at(1));

        let second = set
            .commit::<Infallible>(&request("/docs/a.txt", Some(first.updated_at)), at(1))
            .unwrap();
        assert!(second.updated_at > first.updated_at);
    }
}
