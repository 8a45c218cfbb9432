use async_trait::async_trait;
use serde::Serialize;

use super::error::StorageError;
use crate::fragment::Fragment;

/// Result of listing an owner's fragments.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum FragmentListing {
    /// Fragment ids only.
    Ids(Vec<String>),
    /// Full metadata records.
    Expanded(Vec<Fragment>),
}

impl FragmentListing {
    pub fn from_fragments(fragments: Vec<Fragment>, expand: bool) -> Self {
        if expand {
            Self::Expanded(fragments)
        } else {
            Self::Ids(fragments.into_iter().map(|f| f.id().to_string()).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in listing order, whichever form the listing has.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Ids(ids) => ids.iter().map(String::as_str).collect(),
            Self::Expanded(fragments) => fragments.iter().map(Fragment::id).collect(),
        }
    }
}

/// Persistence for fragment metadata records and raw payloads.
///
/// Every operation is keyed by `(owner_id, id)`. Implementations must make
/// each single-key read and write atomic; no cross-key guarantees are needed.
#[async_trait]
pub trait FragmentBackend: Send + Sync {
    /// Insert or replace the metadata record.
    async fn write_fragment(&self, fragment: &Fragment) -> Result<(), StorageError>;

    /// Read a metadata record, `None` if absent.
    async fn read_fragment(&self, owner_id: &str, id: &str)
    -> Result<Option<Fragment>, StorageError>;

    /// Insert or replace the payload.
    async fn write_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
        data: &[u8],
    ) -> Result<(), StorageError>;

    /// Read a payload, `None` if absent.
    async fn read_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Vec<u8>>, StorageError>;

    /// List the owner's fragments. Owners without fragments yield an empty listing.
    async fn list_fragments(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, StorageError>;

    /// Remove metadata and payload.
    ///
    /// Returns [`StorageError::NotFound`] if no metadata record exists.
    async fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<(), StorageError>;
}
