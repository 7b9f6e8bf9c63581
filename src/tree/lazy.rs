//! Lazily populated directory tree over a flat keyspace
//!
//! Nodes live in an arena owned by [`KeyTree`] and are addressed by
//! [`NodeId`], so handles stay valid across re-renders. Each `expand`
//! lists exactly one prefix level; nothing is fetched recursively.

use std::collections::HashSet;

use crate::error::{BrowserError, Result};
use crate::s3::session::ObjectStore;
use crate::tree::node::{KeyTreeNode, NodeId, NodeKind};

/// Handle of the bucket root
pub const ROOT: NodeId = NodeId(0);

/// In-memory tree for one bucket
#[derive(Debug, Clone)]
pub struct KeyTree {
    bucket: String,
    nodes: Vec<KeyTreeNode>,
}

impl KeyTree {
    /// Unpopulated tree whose root stands for `bucket`
    pub fn root_for(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let root = KeyTreeNode {
            id: ROOT,
            parent: None,
            label: bucket.clone(),
            full_key: String::new(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            populated: false,
            expanded: false,
            has_marker: false,
        };

        Self {
            bucket,
            nodes: vec![root],
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn root(&self) -> &KeyTreeNode {
        &self.nodes[ROOT.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&KeyTreeNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&KeyTreeNode> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| BrowserError::Validation(format!("unknown node #{}", id.0)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut KeyTreeNode> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| BrowserError::Validation(format!("unknown node #{}", id.0)))
    }

    /// Children of `id` in listing order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &KeyTreeNode> + '_ {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |child| &self.nodes[child.0])
    }

    /// Node whose full key is `key`, if it has been loaded
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.full_key == key).map(|n| n.id)
    }

    /// Number of nodes loaded so far, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Reveal the children of `id`, listing them from the store on first use.
    ///
    /// A populated node returns its children unchanged without a store call.
    /// On a failed listing nothing is committed and the node stays
    /// unpopulated, so the next call retries.
    pub async fn expand<S>(&mut self, store: &S, id: NodeId) -> Result<Vec<NodeId>>
    where
        S: ObjectStore + ?Sized,
    {
        let node = self.node(id)?;

        if node.populated {
            let children = node.children.clone();
            self.node_mut(id)?.expanded = true;
            return Ok(children);
        }

        // An object has no key level beneath it
        if node.kind == NodeKind::Object {
            let node = self.node_mut(id)?;
            node.populated = true;
            node.expanded = true;
            return Ok(Vec::new());
        }

        let prefix = node.full_key.clone();
        let entries = store.list_immediate_children(&self.bucket, &prefix).await?;

        let mut seen = HashSet::new();
        let mut has_marker = false;
        let mut children = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.key == prefix {
                has_marker = true;
                continue;
            }

            let label = match entry.key.strip_prefix(prefix.as_str()) {
                Some(label) if !label.is_empty() => label.to_string(),
                _ => {
                    tracing::warn!(
                        "Ignoring key '{}' outside prefix '{}' in bucket {}",
                        entry.key,
                        prefix,
                        self.bucket
                    );
                    continue;
                }
            };

            if !seen.insert(entry.key.clone()) {
                continue;
            }

            let child = self.push_child(id, &label, entry.key);
            child.has_marker = entry.is_directory_marker;
            children.push(child.id);
        }

        tracing::debug!(
            "Expanded '{}' in {} with {} children",
            prefix,
            self.bucket,
            children.len()
        );

        let node = self.node_mut(id)?;
        node.children = children.clone();
        node.populated = true;
        node.expanded = true;
        node.has_marker |= has_marker;

        Ok(children)
    }

    /// Hide the children of `id`. Loaded children are kept.
    pub fn collapse(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.expanded = false;
        Ok(())
    }

    /// Rows to render: the root, then every child of an expanded node,
    /// depth first, with their depth.
    pub fn visible_rows(&self) -> Vec<(usize, &KeyTreeNode)> {
        let mut rows = Vec::new();
        let mut stack = vec![(0usize, ROOT)];

        while let Some((depth, id)) = stack.pop() {
            let node = &self.nodes[id.0];
            rows.push((depth, node));
            if node.expanded {
                for child in node.children.iter().rev() {
                    stack.push((depth + 1, *child));
                }
            }
        }

        rows
    }

    /// Add a node for `full_key` under `parent` to the arena. Linking it
    /// into the parent's children is left to the caller.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        label: &str,
        full_key: String,
    ) -> &mut KeyTreeNode {
        let id = NodeId(self.nodes.len());
        self.nodes.push(KeyTreeNode::child(id, parent, label, full_key));
        &mut self.nodes[id.0]
    }
}
