use std::fmt;

/// Errors raised by a fragment backend.
#[derive(Debug)]
pub enum StorageError {
    /// No record exists for the given owner and id.
    NotFound { owner_id: String, id: String },
    /// An I/O error occurred.
    Io(std::io::Error),
    /// A stored metadata record could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// The key cannot be mapped onto the backend's layout.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { owner_id, id } => {
                write!(f, "missing entry for owner={owner_id} and id={id}")
            }
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Serialization(err) => write!(f, "corrupt fragment record: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: {key}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl StorageError {
    pub(crate) fn not_found(owner_id: &str, id: &str) -> Self {
        Self::NotFound {
            owner_id: owner_id.to_string(),
            id: id.to_string(),
        }
    }
}
