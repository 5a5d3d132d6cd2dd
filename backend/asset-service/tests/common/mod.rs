//! Shared fixtures for asset-service integration tests

#![allow(dead_code)]

use asset_service::config::ResizeConfig;
use asset_service::services::DerivedAssetResolver;
use asset_service::Metrics;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use async_trait::async_trait;
use bytes::Bytes;
use s3_utils::{InMemoryStore, ObjectStore, StoreError, StoreResult};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const STORE_URL: &str = "https://s3-eu-west-1.amazonaws.com/test-bucket";

/// Deterministic gradient image encoded in `format`
pub fn image_bytes(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture image");
    buf
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageOutputFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageOutputFormat::Jpeg(90))
}

pub fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new(STORE_URL))
}

pub fn resize_config(scratch: &Path) -> ResizeConfig {
    ResizeConfig {
        scratch_dir: scratch.to_path_buf(),
        ..ResizeConfig::default()
    }
}

pub fn resolver(store: Arc<impl ObjectStore + 'static>, scratch: &Path) -> DerivedAssetResolver {
    DerivedAssetResolver::new(
        store,
        &resize_config(scratch),
        Metrics::new().expect("metrics registry"),
    )
}

pub fn scratch_entries(scratch: &Path) -> usize {
    std::fs::read_dir(scratch)
        .expect("read scratch root")
        .count()
}

/// In-memory store whose downloads or uploads can be switched to fail
pub struct FailingStore {
    pub inner: Arc<InMemoryStore>,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_get: AtomicBool::new(false),
            fail_put: AtomicBool::new(false),
        })
    }

    pub fn fail_downloads(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::transfer(key, "connection reset"));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::transfer(key, "upload rejected"));
        }
        self.inner.put(key, body, content_type).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
}
