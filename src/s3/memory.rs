//! In-memory store used by unit tests

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BrowserError, Result};
use crate::s3::session::ObjectStore;
use crate::s3::types::{Bucket, ListEntry, ObjectInfo, DELIMITER};

/// Buckets of keys with S3 delimiter semantics, call counters and
/// one-shot failure injection
#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, BTreeMap<String, u64>>>,
    list_calls: AtomicUsize,
    put_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_put: AtomicBool,
}

impl MemoryStore {
    pub fn with_keys(bucket: &str, keys: &[&str]) -> Self {
        let store = Self::default();
        store.add_bucket(bucket, keys);
        store
    }

    pub fn add_bucket(&self, bucket: &str, keys: &[&str]) {
        let objects = keys.iter().map(|k| (k.to_string(), k.len() as u64)).collect();
        self.buckets.lock().unwrap().insert(bucket.to_string(), objects);
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.size_of(bucket, key).is_some()
    }

    pub fn size_of(&self, bucket: &str, key: &str) -> Option<u64> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|objects| objects.get(key).copied())
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn fail_next_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_put(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    fn no_such_bucket(bucket: &str) -> BrowserError {
        BrowserError::NotFound(format!("bucket '{}'", bucket))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let mut names: Vec<String> = self.buckets.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| Bucket {
                name,
                creation_date: None,
            })
            .collect())
    }

    async fn list_immediate_children(&self, bucket: &str, prefix: &str) -> Result<Vec<ListEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.swap(false, Ordering::SeqCst) {
            return Err(BrowserError::Network("connection reset".to_string()));
        }

        let buckets = self.buckets.lock().unwrap();
        let objects = buckets.get(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;

        let mut entries: BTreeMap<String, ListEntry> = BTreeMap::new();
        for key in objects.keys().filter(|k| k.starts_with(prefix)) {
            let rest = &key[prefix.len()..];
            match rest.find(DELIMITER) {
                Some(pos) => {
                    let grouped = format!("{}{}", prefix, &rest[..=pos]);
                    entries
                        .entry(grouped.clone())
                        .or_insert_with(|| ListEntry::prefix(grouped));
                }
                None => {
                    entries.insert(key.clone(), ListEntry::object(key.clone()));
                }
            }
        }

        Ok(entries.into_values().collect())
    }

    async fn put_empty_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.swap(false, Ordering::SeqCst) {
            return Err(BrowserError::Network("connection reset".to_string()));
        }

        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        objects.insert(key.to_string(), 0);
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let size = self
            .size_of(bucket, key)
            .ok_or_else(|| BrowserError::NotFound(format!("s3://{}/{}", bucket, key)))?;

        Ok(ObjectInfo {
            key: key.to_string(),
            size,
            last_modified: None,
            etag: Some(format!("etag-{}", size)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grouping_matches_delimiter_listing() {
        let store = MemoryStore::with_keys("docs", &["a/", "a/x.txt", "a/b/c.txt", "a", "z.txt"]);

        let root: Vec<ListEntry> = store.list_immediate_children("docs", "").await.unwrap();
        assert_eq!(
            root,
            vec![
                ListEntry::object("a"),
                ListEntry::prefix("a/"),
                ListEntry::object("z.txt"),
            ]
        );

        let a = store.list_immediate_children("docs", "a/").await.unwrap();
        assert_eq!(
            a,
            vec![
                ListEntry::object("a/"),
                ListEntry::prefix("a/b/"),
                ListEntry::object("a/x.txt"),
            ]
        );
    }
}
