//! Object store abstraction used by media services.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Transfer failed for {key}: {message}")]
    Transfer { key: String, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn transfer(key: &str, message: impl Into<String>) -> Self {
        StoreError::Transfer {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value object storage with public URLs.
///
/// Keys are slash-delimited paths. `put` replaces the whole object or
/// fails without leaving a partial write.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Returns [`StoreError::NotFound`] when no object lives at `key`.
    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()>;

    /// URL a client can be redirected to for `key`
    fn public_url(&self, key: &str) -> String;

    async fn health_check(&self) -> StoreResult<()>;
}
