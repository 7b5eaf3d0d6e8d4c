use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::maybe_mime::MaybeMime;
use super::path;

/// Whether a record is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Directory => write!(f, "directory"),
        }
    }
}

/// A content item as held by the remote store.
///
/// Optional fields default here, at the fetch boundary, so nothing past
/// [`Record::validated`] has to care which fields the store actually sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub mime_hint: MaybeMime,
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl Record {
    /// A published file record, parented on its path's parent directory.
    pub fn file(path: &str, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(path, NodeKind::File, Some(content.into()), at)
    }

    /// A published directory record, parented on its path's parent directory.
    pub fn directory(path: &str, at: DateTime<Utc>) -> Self {
        Self::new(path, NodeKind::Directory, None, at)
    }

    fn new(path: &str, kind: NodeKind, content: Option<String>, at: DateTime<Utc>) -> Self {
        let path = path::normalize(path);
        Self {
            title: path::name(&path).to_string(),
            parent_path: path::parent(&path),
            path,
            kind,
            content,
            mime_hint: MaybeMime(None),
            sort_order: 0,
            created_at: at,
            updated_at: at,
            published: true,
        }
    }

    pub fn with_parent(mut self, parent: Option<&str>) -> Self {
        self.parent_path = parent.map(path::normalize);
        self
    }

    pub fn with_mime(mut self, mime: mime::Mime) -> Self {
        self.mime_hint = MaybeMime(Some(mime));
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    /// Normalize the record's paths and fill in derived defaults.
    ///
    /// The root never has a parent, and directories never carry content.
    pub fn validated(mut self) -> Self {
        self.path = path::normalize(&self.path);
        self.parent_path = if self.path == path::ROOT {
            None
        } else {
            self.parent_path.as_deref().map(path::normalize)
        };
        if self.title.is_empty() {
            self.title = path::name(&self.path).to_string();
        }
        match self.kind {
            NodeKind::Directory => self.content = None,
            NodeKind::File => {
                if self.content.is_none() {
                    self.content = Some(String::new());
                }
            }
        }
        self
    }
}
