use std::sync::Arc;

use common::StorageError;
use common::storage::{FilesystemBackend, FragmentBackend, MemoryBackend};
use tracing::info;

use crate::config::{BackendKind, StorageConfig};

/// Construct the configured backend once at startup.
pub async fn init_backend(config: &StorageConfig) -> Result<Arc<dyn FragmentBackend>, StorageError> {
    match config.backend {
        BackendKind::Memory => {
            info!("Using in-memory fragment backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Filesystem => {
            info!(path = %config.path.display(), "Using filesystem fragment backend");
            Ok(Arc::new(FilesystemBackend::new(config.path.clone()).await?))
        }
    }
}
