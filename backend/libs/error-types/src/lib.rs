//! Shared error response format for Nova HTTP services.
//!
//! Services keep their own error enums and render them through
//! [`ErrorResponse`] so clients see one JSON shape everywhere.

use serde::{Deserialize, Serialize};

/// Unified API error body returned by every service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short reason phrase ("Not Found", "Bad Gateway", ...)
    pub error: String,

    /// Human readable message
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error category used by clients for routing, see [`error_types`]
    pub error_type: String,

    /// Stable machine code, see [`error_codes`]
    pub code: String,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Stable error codes
pub mod error_codes {
    // Media / assets
    pub const MEDIA_NOT_FOUND: &str = "MEDIA_NOT_FOUND";
    pub const MEDIA_PROCESSING_FAILED: &str = "MEDIA_PROCESSING_FAILED";
    pub const UNSUPPORTED_FORMAT: &str = "UNSUPPORTED_FORMAT";
    pub const STORAGE_TRANSFER_FAILED: &str = "STORAGE_TRANSFER_FAILED";

    // Request
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    // System
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
}

/// Error categories
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const UPSTREAM_ERROR: &str = "upstream_error";
    pub const SERVER_ERROR: &str = "server_error";
    pub const SERVICE_UNAVAILABLE_ERROR: &str = "service_unavailable_error";
}
