//! Failures of a single resolution

use s3_utils::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The original object is missing from the store
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Fetched bytes are not a decodable image
    #[error("Failed to decode image {key}: {message}")]
    DecodeFailure { key: String, message: String },

    /// Store I/O failed on existence check, fetch or upload
    #[error("Storage transfer failed: {0}")]
    TransferFailure(String),

    /// Resampling or JPEG encoding failed
    #[error("Failed to encode derivative: {0}")]
    EncodeFailure(String),

    /// Local scratch storage could not be written or read
    #[error("Scratch storage error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    /// Label used for failure metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "not_found",
            ResolveError::DecodeFailure { .. } => "decode",
            ResolveError::TransferFailure(_) => "transfer",
            ResolveError::EncodeFailure(_) => "encode",
            ResolveError::Scratch(_) => "scratch",
            ResolveError::InvalidRequest(_) => "invalid_request",
            ResolveError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => ResolveError::NotFound(key),
            other => ResolveError::TransferFailure(other.to_string()),
        }
    }
}
