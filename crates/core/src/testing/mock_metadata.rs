//! Mock metadata reader for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConverterError, MediaInfo, MetadataReader};

/// Mock implementation of the MetadataReader trait.
///
/// Unknown paths get three minutes at 320 kbps unless a default is set.
#[derive(Debug, Clone, Default)]
pub struct MockMetadataReader {
    /// Pre-configured results by path.
    results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    /// Result for paths without a configured entry.
    default_info: Arc<RwLock<Option<MediaInfo>>>,
    /// If set, the next read will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Paths read so far, in order.
    reads: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockMetadataReader {
    /// Create a new mock reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result for a specific path.
    pub async fn set_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Set the result for paths without a specific entry.
    pub async fn set_default_info(&self, info: MediaInfo) {
        *self.default_info.write().await = Some(info);
    }

    /// Configure the next read to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Paths read so far.
    pub async fn reads(&self) -> Vec<PathBuf> {
        self.reads.read().await.clone()
    }

    fn fallback_info(path: &Path) -> MediaInfo {
        MediaInfo {
            path: path.to_path_buf(),
            duration: Duration::from_secs(180),
            audio_bitrate_kbps: Some(320),
        }
    }
}

#[async_trait]
impl MetadataReader for MockMetadataReader {
    async fn read(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        self.reads.write().await.push(path.to_path_buf());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(info) = self.results.read().await.get(path) {
            return Ok(info.clone());
        }

        if let Some(info) = self.default_info.read().await.as_ref() {
            let mut info = info.clone();
            info.path = path.to_path_buf();
            return Ok(info);
        }

        Ok(Self::fallback_info(path))
    }
}
