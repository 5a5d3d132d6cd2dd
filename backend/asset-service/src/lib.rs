//! Asset Service
//!
//! Serves files from object storage and size-bound images derived on demand.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
pub use metrics::Metrics;
