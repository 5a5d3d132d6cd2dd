/// Process-local object store for development and tests
use crate::store::{ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    base_url: String,
    objects: DashMap<String, StoredObject>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Seed an object directly, bypassing the put counter
    pub fn insert(&self, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::Relaxed)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.objects.contains_key(key))
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.objects
            .get(key)
            .map(|entry| entry.body.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.insert(key, body, content_type);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
