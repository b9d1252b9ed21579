//! Per-request scoped temporary directory

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name prefix of every workspace directory
pub const WORKSPACE_PREFIX: &str = "skillspan-run-";

/// Exclusively owned temporary directory for one execution.
///
/// Removed by [`Workspace::close`] on the normal path; if the owner is
/// dropped first (early return, panic, cancelled future), the directory
/// is removed on drop instead.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `root`
    pub async fn create(root: &Path) -> io::Result<Self> {
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir_in(root)
        })
        .await
        .map_err(io::Error::other)??;

        let path = dir.path().to_path_buf();
        tracing::debug!(workspace = %path.display(), "Workspace created");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a file with a fixed, trusted name; only `contents` is user data
    pub async fn write_source(&self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        let file = self.path.join(file_name);
        tokio::fs::write(&file, contents).await?;
        Ok(file)
    }

    /// Remove the directory recursively. Failures are logged, never returned.
    pub async fn close(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = self.path.clone();

        let removed = tokio::task::spawn_blocking(move || dir.close()).await;
        match removed {
            Ok(Ok(())) => tracing::debug!(workspace = %path.display(), "Workspace released"),
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(workspace = %path.display(), "Workspace already gone")
            }
            Ok(Err(e)) => {
                tracing::warn!(workspace = %path.display(), error = %e, "Failed to remove workspace")
            }
            Err(e) => {
                tracing::warn!(workspace = %path.display(), error = %e, "Workspace cleanup task failed")
            }
        }
    }
}
