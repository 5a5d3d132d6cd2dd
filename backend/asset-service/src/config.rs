/// Configuration management for asset-service
///
/// Loads configuration from environment variables with sensible defaults.
use s3_utils::S3Config;
use serde::Deserialize;
use std::path::PathBuf;

use crate::services::resize::DEFAULT_JPEG_QUALITY;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub s3: S3Config,
    pub resize: ResizeConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
    /// Externally reachable base URL of this service
    pub public_url: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown STORAGE_BACKEND '{other}' (expected s3 or memory)")),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResizeConfig {
    /// Root under which per-request scratch directories are created
    pub scratch_dir: PathBuf,
    pub jpeg_quality: u8,
    pub passthrough_cache_capacity: u64,
    pub passthrough_cache_ttl_secs: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("asset-service"),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            passthrough_cache_capacity: 10_000,
            passthrough_cache_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let resize_defaults = ResizeConfig::default();
        let port = std::env::var("ASSET_SERVICE_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Config {
            app: AppConfig {
                host: std::env::var("ASSET_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                public_url: std::env::var("ASSET_SERVICE_PUBLIC_URL")
                    .unwrap_or_else(|_| format!("http://localhost:{port}")),
            },
            cors: CorsConfig {
                allowed_origins: parse_list(
                    &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                ),
            },
            storage: StorageConfig {
                backend: std::env::var("STORAGE_BACKEND")
                    .unwrap_or_else(|_| "s3".to_string())
                    .parse()?,
            },
            s3: S3Config::from_env(),
            resize: ResizeConfig {
                scratch_dir: std::env::var("SCRATCH_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(resize_defaults.scratch_dir),
                jpeg_quality: std::env::var("RESIZE_JPEG_QUALITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(resize_defaults.jpeg_quality),
                passthrough_cache_capacity: std::env::var("PASSTHROUGH_CACHE_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(resize_defaults.passthrough_cache_capacity),
                passthrough_cache_ttl_secs: std::env::var("PASSTHROUGH_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(resize_defaults.passthrough_cache_ttl_secs),
            },
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
