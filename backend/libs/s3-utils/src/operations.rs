/// S3-backed object store
use crate::config::S3Config;
use crate::store::{ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct S3Store {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Store {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Build the AWS client and wait for its configuration to load.
    ///
    /// Static credentials from the config take precedence over the default
    /// provider chain; a custom endpoint switches to path-style addressing.
    pub async fn connect(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "asset_service_s3",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self::new(Arc::new(Client::from_conf(s3_config)), config)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    Ok(false)
                } else {
                    Err(StoreError::transfer(key, DisplayErrorContext(&e).to_string()))
                }
            }
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::transfer(key, DisplayErrorContext(&e).to_string())
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::transfer(key, format!("failed to read body: {e}")))?
            .into_bytes();

        debug!(key = %key, size = body.len(), "Downloaded from S3");
        Ok(body)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            // Derived objects are immutable for a given key
            .cache_control("max-age=31536000")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::transfer(key, DisplayErrorContext(&e).to_string()))?;

        debug!(key = %key, size, "Uploaded to S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.config.object_url(key)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
