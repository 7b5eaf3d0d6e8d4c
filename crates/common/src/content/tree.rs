use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mime::Mime;

use super::node::{NodeMetadata, NodeStat, TreeNode};
use super::path;
use super::record::{NodeKind, Record};

/**
 * Content Tree
 * ============
 * The remote store keeps content as a flat list of records keyed by path.
 *  The tree is built from that list in three passes:
 *  - materialize: one node per record, keyed by path
 *  - link: every record whose parent is a known directory registers its
 *     name in that directory's children
 *  - order: children are sorted by name (ordinal, case-sensitive)
 * Lookup by path and reachability through children are two separate
 *  indices over the same nodes. A record whose parent isn't a directory
 *  in the set is an orphan: `get` finds it, no listing ever shows it.
 */
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    nodes: HashMap<String, TreeNode>,
}

impl ContentTree {
    /// Build a tree from the store's records.
    ///
    /// Records are expected in `sort_order`; when two share a path the
    ///  later one wins. A root directory is synthesized if none is given.
    pub fn build(records: Vec<Record>, now: DateTime<Utc>) -> Self {
        let mut nodes: HashMap<String, TreeNode> = HashMap::with_capacity(records.len() + 1);

        // pass 1: materialize
        for record in records {
            let node = TreeNode::from(record);
            nodes.insert(node.path.clone(), node);
        }

        if !nodes.get(path::ROOT).is_some_and(TreeNode::is_dir) {
            tracing::debug!("record set has no root directory, synthesizing one");
            nodes.insert(
                path::ROOT.to_string(),
                TreeNode::from(Record::directory(path::ROOT, now)),
            );
        }

        // pass 2: link
        let links: Vec<(String, String)> = nodes
            .values()
            .filter_map(|node| {
                let parent = node.parent_path.as_ref().filter(|p| **p != node.path)?;
                Some((parent.clone(), path::name(&node.path).to_string()))
            })
            .collect();

        let mut orphans = 0usize;
        for (parent, name) in links {
            match nodes.get_mut(&parent).and_then(|p| p.children.as_mut()) {
                Some(children) => children.push(name),
                None => orphans += 1,
            }
        }

        // pass 3: order
        for children in nodes.values_mut().filter_map(|n| n.children.as_mut()) {
            children.sort_unstable();
            children.dedup();
        }

        if orphans > 0 {
            tracing::debug!("{} node(s) have no directory parent and are unlisted", orphans);
        }

        Self { nodes }
    }

    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.get(path).is_some_and(TreeNode::is_dir)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.get(path).is_some_and(TreeNode::is_file)
    }

    /// Child names of a directory, sorted. Empty for files and missing paths.
    pub fn children(&self, path: &str) -> &[String] {
        self.get(path)
            .and_then(|n| n.children.as_deref())
            .unwrap_or(&[])
    }

    pub fn metadata(&self, path: &str) -> Option<NodeMetadata> {
        self.get(path).map(TreeNode::metadata)
    }

    pub fn stat(&self, path: &str) -> Option<NodeStat> {
        self.get(path).map(TreeNode::stat)
    }

    /// Stats of every listed child of a directory, in listing order.
    pub fn ls(&self, dir: &str) -> Vec<NodeStat> {
        self.children(dir)
            .iter()
            .filter_map(|name| self.stat(&path::join(dir, name)))
            .collect()
    }

    /// Every path reachable below `dir`, depth first, in listing order.
    pub fn walk(&self, dir: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<String> = self
            .children(dir)
            .iter()
            .rev()
            .map(|name| path::join(dir, name))
            .collect();

        while let Some(current) = stack.pop() {
            stack.extend(
                self.children(&current)
                    .iter()
                    .rev()
                    .map(|name| path::join(&current, name)),
            );
            out.push(current);
        }
        out
    }

    /// Apply a committed file write.
    ///
    /// Updates the node in place, or inserts it and registers its name in
    ///  the parent's children at its sorted position. Returns true if the
    ///  node was created.
    pub fn upsert_file(
        &mut self,
        file_path: &str,
        content: String,
        updated_at: DateTime<Utc>,
        mime_hint: Option<Mime>,
    ) -> bool {
        if let Some(node) = self.nodes.get_mut(file_path) {
            node.content = Some(content);
            node.updated_at = updated_at;
            if mime_hint.is_some() {
                node.mime_hint = mime_hint;
            }
            return false;
        }

        let mut record = Record::file(file_path, content, updated_at);
        if let Some(mime) = mime_hint {
            record = record.with_mime(mime);
        }
        let node = TreeNode::from(record);

        if let Some(children) = node
            .parent_path
            .as_ref()
            .and_then(|parent| self.nodes.get_mut(parent))
            .and_then(|parent| parent.children.as_mut())
        {
            let name = path::name(&node.path).to_string();
            if let Err(idx) = children.binary_search(&name) {
                children.insert(idx, name);
            }
        }

        self.nodes.insert(node.path.clone(), node);
        true
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn directory_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_dir()).count()
    }

    pub fn file_count(&self) -> usize {
        self.nodes.values().filter(|n| n.kind == NodeKind::File).count()
    }
}
