//! Tree node types

use crate::s3::types::DELIMITER;

/// Stable handle to a node inside a [`KeyTree`](crate::tree::KeyTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    Object,
}

impl NodeKind {
    /// Directory iff the key ends in the delimiter
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(DELIMITER) {
            NodeKind::Directory
        } else {
            NodeKind::Object
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Directory => "directory",
            NodeKind::Object => "object",
        }
    }
}

/// One key or key prefix in the tree
#[derive(Debug, Clone)]
pub struct KeyTreeNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) label: String,
    pub(crate) full_key: String,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) populated: bool,
    pub(crate) expanded: bool,
    pub(crate) has_marker: bool,
}

impl KeyTreeNode {
    pub(crate) fn child(id: NodeId, parent: NodeId, label: &str, full_key: String) -> Self {
        Self {
            id,
            parent: Some(parent),
            label: label.to_string(),
            kind: NodeKind::from_key(&full_key),
            full_key,
            children: Vec::new(),
            populated: false,
            expanded: false,
            has_marker: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Path segment shown to the user
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Complete key or key prefix from the bucket root
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the children have been listed
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether a marker object for this prefix is known to exist
    pub fn has_marker(&self) -> bool {
        self.has_marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_key() {
        assert_eq!(NodeKind::from_key("a/"), NodeKind::Directory);
        assert_eq!(NodeKind::from_key("a/b/"), NodeKind::Directory);
        assert_eq!(NodeKind::from_key("a"), NodeKind::Object);
        assert_eq!(NodeKind::from_key("a/notes.txt"), NodeKind::Object);
    }

    #[test]
    fn test_child_starts_unpopulated() {
        let node = KeyTreeNode::child(NodeId(3), NodeId(0), "b/", "a/b/".to_string());
        assert_eq!(node.label(), "b/");
        assert_eq!(node.full_key(), "a/b/");
        assert!(node.is_directory());
        assert!(!node.is_populated());
        assert!(node.children().is_empty());
        assert_eq!(node.parent(), Some(NodeId(0)));
    }
}
