use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use flate2::Compression;
use flate2::write::GzEncoder;
use parking_lot::RwLock;

use crate::{Connector, ObjectStore, StorageError};

/// In-process object store for tests, keyed by bucket then key in insertion order
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    buckets: Arc<RwLock<HashMap<String, Vec<(String, Vec<u8>)>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes, replacing any object with the same key
    pub fn put(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        let mut buckets = self.buckets.write();
        let objects = buckets.entry(bucket.to_string()).or_default();
        let bytes = bytes.into();
        match objects.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = bytes,
            None => objects.push((key.to_string(), bytes)),
        }
    }

    /// Store text gzip-compressed, the way log objects are written
    pub fn put_gzipped(&self, bucket: &str, key: &str, text: &str) -> std::io::Result<()> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes())?;
        self.put(bucket, key, encoder.finish()?);
        Ok(())
    }
}

impl ObjectStore for MemoryStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::Connection(format!("bucket '{}' does not exist", bucket)))?;

        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.buckets
            .read()
            .get(bucket)
            .and_then(|objects| objects.iter().find(|(k, _)| k == key))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

impl Connector for MemoryStore {
    type Store = MemoryStore;

    async fn open(&self, _profile: &str) -> Result<MemoryStore, StorageError> {
        Ok(self.clone())
    }
}
