//! Core facade used by the shell
//!
//! Owns at most one session and one tree at a time. Establishing a new
//! session supersedes the old one only once the new one is usable.

use crate::error::{BrowserError, Result};
use crate::s3::profiles::ProfileRegistry;
use crate::s3::session::{ObjectStore, S3Session};
use crate::s3::types::{Bucket, ConnectionProfile, ObjectInfo};
use crate::tree::{KeyTree, NodeId, ROOT};

struct ActiveSession<S> {
    profile: String,
    store: S,
}

pub struct Browser<S = S3Session> {
    registry: ProfileRegistry,
    session: Option<ActiveSession<S>>,
    tree: Option<KeyTree>,
}

impl<S: ObjectStore> Browser<S> {
    pub fn new(registry: ProfileRegistry) -> Self {
        Self {
            registry,
            session: None,
            tree: None,
        }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.registry.list_profiles()
    }

    pub fn save_profile(&self, profile: &ConnectionProfile) -> Result<()> {
        self.registry.save(profile)
    }

    /// Make `store` the active session and drop the tree of the previous one
    pub fn attach_session(&mut self, profile: impl Into<String>, store: S) {
        let profile = profile.into();
        tracing::debug!("Active session is now '{}'", profile);
        self.session = Some(ActiveSession { profile, store });
        self.tree = None;
    }

    /// Name of the profile behind the active session
    pub fn profile_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.profile.as_str())
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn tree(&self) -> Option<&KeyTree> {
        self.tree.as_ref()
    }

    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        self.store()?.list_buckets().await
    }

    /// Root a new tree at `bucket` and populate its first level.
    ///
    /// The new tree replaces the open one once its root is listed. A network
    /// failure still opens it with an unpopulated root so expanding it again
    /// retries; any other failure keeps the previous tree.
    pub async fn open_bucket(&mut self, bucket: &str) -> Result<Vec<NodeId>> {
        if bucket.trim().is_empty() {
            return Err(BrowserError::Validation("bucket name is required".to_string()));
        }

        let session = self.session.as_ref().ok_or_else(not_connected)?;
        let mut tree = KeyTree::root_for(bucket);
        let result = tree.expand(&session.store, ROOT).await;

        match &result {
            Ok(_) | Err(BrowserError::Network(_)) => self.tree = Some(tree),
            Err(e) => tracing::debug!("Keeping the open tree, '{}' failed: {}", bucket, e),
        }
        result
    }

    pub async fn expand(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let session = self.session.as_ref().ok_or_else(not_connected)?;
        let tree = self.tree.as_mut().ok_or_else(no_bucket)?;
        tree.expand(&session.store, id).await
    }

    pub fn collapse(&mut self, id: NodeId) -> Result<()> {
        self.tree.as_mut().ok_or_else(no_bucket)?.collapse(id)
    }

    /// Create a directory named `name` under `parent`; returns its key
    pub async fn create_directory(&mut self, parent: NodeId, name: &str) -> Result<String> {
        let session = self.session.as_ref().ok_or_else(not_connected)?;
        let tree = self.tree.as_mut().ok_or_else(no_bucket)?;
        tree.create_directory(&session.store, parent, name).await
    }

    /// Metadata of `key` in the open bucket
    pub async fn stat_object(&self, key: &str) -> Result<ObjectInfo> {
        let tree = self.tree.as_ref().ok_or_else(no_bucket)?;
        self.store()?.stat_object(tree.bucket(), key).await
    }

    /// Resolve a full key to a loaded node. Empty or `/` is the root.
    pub fn resolve(&self, key: &str) -> Result<NodeId> {
        let tree = self.tree.as_ref().ok_or_else(no_bucket)?;
        if key.is_empty() || key == "/" {
            return Ok(ROOT);
        }
        tree.find(key).ok_or_else(|| {
            BrowserError::NotFound(format!(
                "'{}' is not loaded; expand its parent first",
                key
            ))
        })
    }

    fn store(&self) -> Result<&S> {
        self.session
            .as_ref()
            .map(|s| &s.store)
            .ok_or_else(not_connected)
    }
}

impl Browser<S3Session> {
    /// Load `profile_name`, connect, and make it the active session.
    ///
    /// On failure the previous session and tree are left untouched.
    pub async fn establish_session(&mut self, profile_name: &str) -> Result<Vec<Bucket>> {
        let profile = self.registry.load(profile_name)?;
        let (session, buckets) = S3Session::establish(&profile).await?;

        tracing::info!(
            "Connected to {} with profile '{}' ({} buckets)",
            session.endpoint(),
            profile_name,
            buckets.len()
        );

        self.attach_session(profile_name, session);
        Ok(buckets)
    }
}

fn not_connected() -> BrowserError {
    BrowserError::Config("no active session; connect with a profile first".to_string())
}

fn no_bucket() -> BrowserError {
    BrowserError::Validation("no bucket is open".to_string())
}
