/// Business logic layer for asset-service
pub mod resize;

pub use resize::{AssetKey, DerivedAssetResolver, Resolution, ResolveError};
