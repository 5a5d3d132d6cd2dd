/// S3 configuration shared across services
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL for public access
    pub base_url: String,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
    /// Static credentials; the default provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible storage (MinIO, LocalStack)
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "avant-html-1".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            base_url: std::env::var("S3_BASE_URL")
                .unwrap_or_else(|_| "https://s3-eu-west-1.amazonaws.com".to_string()),
            path_style: std::env::var("S3_PATH_STYLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
        }
    }

    /// Build the public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path_style {
            format!("{}/{}/{}", base, self.bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
        }
    }
}
