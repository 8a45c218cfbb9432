use thiserror::Error;

use crate::media::MediaTypeError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum FragmentError {
    /// Bad construction input. Always the caller's to fix.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("fragment store error: {0}")]
    Store(StorageError),
}

impl From<StorageError> for FragmentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => FragmentError::NotFound(err.to_string()),
            other => FragmentError::Store(other),
        }
    }
}

impl From<MediaTypeError> for FragmentError {
    fn from(err: MediaTypeError) -> Self {
        FragmentError::Validation(err.to_string())
    }
}
