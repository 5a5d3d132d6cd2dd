//! On-demand image resizing backed by the object store
//!
//! - Derived key naming
//! - Per-request scratch storage
//! - Image processor for resizing and encoding
//! - Resolver coordinating cache lookup, derivation and upload

pub mod error;
pub mod keys;
pub mod processor;
pub mod resolver;
pub mod scratch;

pub use error::ResolveError;
pub use keys::{derive_key, AssetKey, RESIZED_PREFIX};
pub use processor::{Dimensions, ImageResizer, ResizeOutcome, DEFAULT_JPEG_QUALITY};
pub use resolver::{DerivedAsset, DerivedAssetResolver, Resolution, DERIVED_CONTENT_TYPE};
pub use scratch::ScratchSpace;
