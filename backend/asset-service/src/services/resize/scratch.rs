//! Per-request scratch storage for the original/derivative file pair

use super::keys::AssetKey;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// Scratch directory owned by one resolution.
///
/// Each request gets its own directory named after a fresh request token, so
/// concurrent requests for the same key never share files. The directory and
/// everything in it is removed when the value is dropped, on success and on
/// every error path alike.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    token: Uuid,
    original: PathBuf,
    derived: PathBuf,
}

impl ScratchSpace {
    pub fn create(root: &Path, key: &AssetKey) -> io::Result<Self> {
        let token = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("req-{}-", token.simple()))
            .tempdir_in(root)?;

        let original = match key.extension() {
            Some(ext) => dir.path().join(format!("original.{ext}")),
            None => dir.path().join("original"),
        };
        let derived = dir.path().join("derived.jpg");

        debug!(%token, key = %key, dir = %dir.path().display(), "Scratch space created");

        Ok(Self {
            dir: Some(dir),
            token,
            original,
            derived,
        })
    }

    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn original_path(&self) -> &Path {
        &self.original
    }

    pub fn derived_path(&self) -> &Path {
        &self.derived
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(token = %self.token, path = %path.display(), error = %e, "Failed to remove scratch space");
            }
        }
    }
}

/// Empty and recreate the scratch root; run once at startup
pub async fn reset_root(root: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(root).await
}
