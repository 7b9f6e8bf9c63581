//! Store data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Character grouping flat keys into apparent directory levels
pub const DELIMITER: char = '/';

/// Represents a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// One entry of a single-level listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full key, or key prefix for grouped entries
    pub key: String,
    /// True for a stored object whose key ends in the delimiter
    pub is_directory_marker: bool,
}

impl ListEntry {
    /// Entry produced by delimiter grouping (no object of its own)
    pub fn prefix(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_directory_marker: false,
        }
    }

    /// Entry for a stored object
    pub fn object(key: impl Into<String>) -> Self {
        let key = key.into();
        let is_directory_marker = key.ends_with(DELIMITER);
        Self {
            key,
            is_directory_marker,
        }
    }
}

/// Object metadata as returned by a stat call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl ObjectInfo {
    /// Get a human-readable size string
    pub fn size_string(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;
        const TB: u64 = GB * 1024;

        if self.size >= TB {
            format!("{:.2} TB", self.size as f64 / TB as f64)
        } else if self.size >= GB {
            format!("{:.2} GB", self.size as f64 / GB as f64)
        } else if self.size >= MB {
            format!("{:.2} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.2} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

/// Saved connection settings for one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub ignore_ssl_verification: bool,
}
