// Local filesystem adapter - Temp files and list files on the local disk

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// Local filesystem adapter
pub struct FsLocalAdapter {
    temp_dir: PathBuf,
}

impl FsLocalAdapter {
    /// Create temp files in `temp_dir`, creating it if needed
    pub fn new(temp_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let temp_dir = temp_dir.into();
        std::fs::create_dir_all(&temp_dir).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create temp directory {}: {}",
                temp_dir.display(),
                e
            ))
        })?;
        Ok(Self { temp_dir })
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn create_temp_file(&self, prefix: &str, suffix: &str) -> Result<PathBuf, DomainError> {
        let temp_file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| DomainError::FsFail(format!("Failed to create temp file: {}", e)))?;

        // Persist; removal goes through remove_file so retention can be honoured
        let (_, path) = temp_file
            .keep()
            .map_err(|e| DomainError::FsFail(format!("Failed to keep temp file: {}", e)))?;
        debug!("Created temp file {}", path.display());
        Ok(path)
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), DomainError> {
        tokio::fs::write(path, contents).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    async fn remove_file(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::remove_file(path).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to delete {}: {}", path.display(), e))
        })
    }
}
