use chrono::{DateTime, Utc};
use mime::Mime;

use super::record::{NodeKind, Record};

/// In-memory projection of a [`Record`].
///
/// Directories carry an ordered list of child *names*; files carry `None`.
/// A node whose parent isn't a known directory is still a node, it just
/// never shows up in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub path: String,
    pub kind: NodeKind,
    pub title: String,
    pub content: Option<String>,
    pub parent_path: Option<String>,
    pub mime_hint: Option<Mime>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub children: Option<Vec<String>>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Content length in bytes for files, zero for directories.
    pub fn size(&self) -> u64 {
        match (&self.kind, &self.content) {
            (NodeKind::File, Some(content)) => content.len() as u64,
            _ => 0,
        }
    }

    pub fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            kind: self.kind,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            mime_hint: self.mime_hint.clone(),
        }
    }

    pub fn stat(&self) -> NodeStat {
        NodeStat {
            path: self.path.clone(),
            is_directory: self.is_dir(),
            kind: self.kind,
            size: self.size(),
            mime_hint: self.mime_hint.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<Record> for TreeNode {
    fn from(record: Record) -> Self {
        let record = record.validated();
        let (mime_hint, children) = match record.kind {
            NodeKind::File => (Some(record.mime_hint.or_guess(&record.path)), None),
            NodeKind::Directory => (record.mime_hint.0, Some(Vec::new())),
        };
        Self {
            path: record.path,
            kind: record.kind,
            title: record.title,
            content: record.content,
            parent_path: record.parent_path,
            mime_hint,
            sort_order: record.sort_order,
            created_at: record.created_at,
            updated_at: record.updated_at,
            children,
        }
    }
}

/// Descriptive metadata for a node, without its content.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetadata {
    pub kind: NodeKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub mime_hint: Option<Mime>,
}

/// Existence plus a cheap summary of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStat {
    pub path: String,
    pub is_directory: bool,
    pub kind: NodeKind,
    pub size: u64,
    pub mime_hint: Option<Mime>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
