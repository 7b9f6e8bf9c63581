//! Directory emulation
//!
//! A folder is made to exist at a prefix by writing a zero-length object
//! whose key ends in the delimiter.

use crate::error::{BrowserError, Result};
use crate::s3::session::ObjectStore;
use crate::s3::types::DELIMITER;
use crate::tree::lazy::KeyTree;
use crate::tree::node::{NodeId, NodeKind};

/// Check that `name` is a single non-empty path segment
pub fn validate_directory_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BrowserError::Validation(
            "directory name is required".to_string(),
        ));
    }
    if name.contains(DELIMITER) {
        return Err(BrowserError::Validation(format!(
            "directory name '{}' must not contain '{}'",
            name, DELIMITER
        )));
    }
    Ok(())
}

/// Write the marker object for `parent_key + name + delimiter` and return
/// that key
pub async fn create_directory<S>(
    store: &S,
    bucket: &str,
    parent_key: &str,
    name: &str,
) -> Result<String>
where
    S: ObjectStore + ?Sized,
{
    validate_directory_name(name)?;

    let key = format!("{}{}{}", parent_key, name, DELIMITER);
    store.put_empty_object(bucket, &key).await?;

    tracing::debug!("Created directory marker s3://{}/{}", bucket, key);
    Ok(key)
}

impl KeyTree {
    /// Create a directory under `parent` and reflect it in the tree without
    /// listing the store again.
    ///
    /// The new node is attached only when `parent` is already populated; an
    /// unpopulated parent picks it up on its first expand. A child with the
    /// same key is never added twice.
    pub async fn create_directory<S>(
        &mut self,
        store: &S,
        parent: NodeId,
        name: &str,
    ) -> Result<String>
    where
        S: ObjectStore + ?Sized,
    {
        let parent_node = self.node(parent)?;
        if parent_node.kind == NodeKind::Object {
            return Err(BrowserError::Validation(format!(
                "'{}' is an object, not a directory",
                parent_node.full_key
            )));
        }

        let parent_key = parent_node.full_key.clone();
        let key = create_directory(store, self.bucket(), &parent_key, name).await?;

        self.attach_directory(parent, name, &key)?;
        Ok(key)
    }

    fn attach_directory(&mut self, parent: NodeId, name: &str, key: &str) -> Result<()> {
        let parent_node = self.node(parent)?;
        if !parent_node.populated {
            return Ok(());
        }

        let existing = parent_node
            .children
            .iter()
            .copied()
            .find(|child| self.get(*child).map(|n| n.full_key.as_str()) == Some(key));

        if let Some(existing) = existing {
            self.node_mut(existing)?.has_marker = true;
            return Ok(());
        }

        let label = format!("{}{}", name, DELIMITER);
        let node = self.push_child(parent, &label, key.to_string());
        node.populated = true;
        node.has_marker = true;
        let id = node.id;
        self.node_mut(parent)?.children.push(id);
        Ok(())
    }
}
