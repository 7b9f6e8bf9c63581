//! Object store access
//!
//! This module provides:
//! - [`session::ObjectStore`] - the operations the tree is built on
//! - [`session::S3Session`] - the S3-compatible implementation
//! - [`profiles::ProfileRegistry`] - saved connection profiles
//! - [`types`] - store data types (Bucket, ListEntry, ObjectInfo, ConnectionProfile)

pub mod profiles;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod memory;

// Re-export commonly used types
pub use profiles::ProfileRegistry;
pub use session::{ObjectStore, S3Session};
pub use types::{Bucket, ConnectionProfile, ListEntry, ObjectInfo, DELIMITER};
