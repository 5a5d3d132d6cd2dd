/// Shared object storage utilities for Nova services
///
/// Provides the [`ObjectStore`] abstraction with an S3 implementation
/// and a process-local one for development and tests.
pub mod config;
pub mod memory;
pub mod operations;
pub mod store;

pub use config::S3Config;
pub use memory::{InMemoryStore, StoredObject};
pub use operations::S3Store;
pub use store::{ObjectStore, StoreError, StoreResult};
