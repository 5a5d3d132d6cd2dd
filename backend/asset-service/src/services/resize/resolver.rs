//! Derived asset resolver - lazily builds and caches size-bound images
//!
//! Resolution workflow for `(key, size)`:
//! 1. Look for `resized/{size}{key}` in the store; redirect there when present
//! 2. Download the original into a per-request scratch directory
//! 3. Decode; originals that already fit the bound are served as-is
//! 4. Resize, encode as JPEG and upload under the derived key
//! 5. Hand the encoded bytes back to the caller
//!
//! Scratch files are released when the [`ScratchSpace`] guard drops.

use super::error::ResolveError;
use super::keys::{derive_key, AssetKey};
use super::processor::{Dimensions, ImageResizer, ResizeOutcome};
use super::scratch::ScratchSpace;
use crate::config::ResizeConfig;
use crate::metrics::Metrics;
use bytes::Bytes;
use dashmap::DashMap;
use moka::future::Cache;
use s3_utils::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Content type of every derivative written to the store
pub const DERIVED_CONTENT_TYPE: &str = "image/jpeg";

/// A freshly derived image
#[derive(Debug, Clone)]
pub struct DerivedAsset {
    pub derived_key: String,
    pub body: Bytes,
    pub dimensions: Dimensions,
    /// Guessed from the original key's extension
    pub content_type: mime::Mime,
    /// Basename of the original key
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    /// Derivative already stored; redirect to it
    Cached { derived_key: String, url: String },
    /// Original already fits the bound; redirect to it
    Original { key: String, url: String },
    /// Derivative built by this call
    Derived(DerivedAsset),
}

impl Resolution {
    fn outcome(&self) -> &'static str {
        match self {
            Resolution::Cached { .. } => "cached",
            Resolution::Original { .. } => "original",
            Resolution::Derived(_) => "derived",
        }
    }
}

/// Removes a derived key's lock entry once no request holds it any more
struct LockRelease<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    derived_key: &'a str,
}

impl Drop for LockRelease<'_> {
    fn drop(&mut self) {
        self.locks
            .remove_if(self.derived_key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct DerivedAssetResolver {
    store: Arc<dyn ObjectStore>,
    resizer: Arc<ImageResizer>,
    scratch_root: PathBuf,
    /// One lock per derived key currently being built
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// (key, size) pairs whose original already fits the bound
    passthrough: Cache<(String, u32), Dimensions>,
    metrics: Metrics,
}

impl DerivedAssetResolver {
    pub fn new(store: Arc<dyn ObjectStore>, config: &ResizeConfig, metrics: Metrics) -> Self {
        let passthrough = Cache::builder()
            .max_capacity(config.passthrough_cache_capacity)
            .time_to_live(Duration::from_secs(config.passthrough_cache_ttl_secs))
            .build();

        Self {
            store,
            resizer: Arc::new(ImageResizer::new(config.jpeg_quality)),
            scratch_root: config.scratch_dir.clone(),
            locks: DashMap::new(),
            passthrough,
            metrics,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Public URL of an asset in the store
    pub fn public_url(&self, key: &AssetKey) -> String {
        self.store.public_url(key.as_str())
    }

    /// Resolve `key` bounded to `size` pixels on its longer side
    pub async fn resolve(&self, key: &AssetKey, size: u32) -> Result<Resolution, ResolveError> {
        let result = self.resolve_inner(key, size).await;

        match &result {
            Ok(resolution) => {
                self.metrics.record_resolution(resolution.outcome());
            }
            Err(e) => {
                self.metrics.record_failure(e.kind());
                warn!(key = %key, size, error = %e, "Image resolution failed");
            }
        }

        result
    }

    async fn resolve_inner(&self, key: &AssetKey, size: u32) -> Result<Resolution, ResolveError> {
        if size == 0 {
            return Err(ResolveError::InvalidRequest(
                "size must be a positive integer".to_string(),
            ));
        }

        let derived_key = derive_key(size, key);

        if self.store.exists(&derived_key).await? {
            return Ok(self.cached(derived_key));
        }

        let memo_key = (key.as_str().to_string(), size);
        if self.passthrough.get(&memo_key).await.is_some() {
            debug!(key = %key, size, "Original known to fit bound");
            return Ok(self.original(key));
        }

        // Declared before the lock handle so it drops last, including when the
        // request future is cancelled while waiting or deriving
        let _release = LockRelease {
            locks: &self.locks,
            derived_key: &derived_key,
        };
        let lock = self
            .locks
            .entry(derived_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        self.derive(key, size, derived_key.clone()).await
    }

    /// Build the derivative. Runs with the derived key's lock held.
    async fn derive(
        &self,
        key: &AssetKey,
        size: u32,
        derived_key: String,
    ) -> Result<Resolution, ResolveError> {
        // Another request may have finished while we waited for the lock
        if self.store.exists(&derived_key).await? {
            return Ok(self.cached(derived_key));
        }

        let scratch = ScratchSpace::create(&self.scratch_root, key)?;
        info!(key = %key, size, token = %scratch.token(), "Creating resized version");

        let original = self.store.get(key.as_str()).await?;
        tokio::fs::write(scratch.original_path(), &original).await?;
        drop(original);

        let resizer = self.resizer.clone();
        let key_str = key.as_str().to_string();
        let original_path = scratch.original_path().to_path_buf();
        let derived_path = scratch.derived_path().to_path_buf();

        let started = Instant::now();
        let outcome = tokio::task::spawn_blocking(move || {
            resizer.process(&key_str, &original_path, &derived_path, size)
        })
        .await
        .map_err(|e| ResolveError::Internal(format!("Resize task panicked: {e}")))??;
        self.metrics.observe_resize(started.elapsed().as_secs_f64());

        let dimensions = match outcome {
            ResizeOutcome::WithinBound(dimensions) => {
                debug!(
                    key = %key,
                    size,
                    width = dimensions.width,
                    height = dimensions.height,
                    "Original already within bound"
                );
                self.passthrough
                    .insert((key.as_str().to_string(), size), dimensions)
                    .await;
                return Ok(self.original(key));
            }
            ResizeOutcome::Resized(dimensions) => dimensions,
        };

        let body = Bytes::from(tokio::fs::read(scratch.derived_path()).await?);
        self.store
            .put(&derived_key, body.clone(), DERIVED_CONTENT_TYPE)
            .await?;

        info!(
            key = %key,
            derived_key = %derived_key,
            width = dimensions.width,
            height = dimensions.height,
            size = body.len(),
            "Done resized version"
        );

        Ok(Resolution::Derived(DerivedAsset {
            derived_key,
            body,
            dimensions,
            content_type: key.content_type(),
            file_name: key.file_name().to_string(),
        }))
    }

    fn cached(&self, derived_key: String) -> Resolution {
        Resolution::Cached {
            url: self.store.public_url(&derived_key),
            derived_key,
        }
    }

    fn original(&self, key: &AssetKey) -> Resolution {
        Resolution::Original {
            key: key.as_str().to_string(),
            url: self.store.public_url(key.as_str()),
        }
    }

    #[cfg(test)]
    fn pending_locks(&self) -> usize {
        self.locks.len()
    }
}
