use std::sync::Arc;

use tracing::{debug, instrument};

use super::{Fragment, FragmentError};
use crate::storage::{FragmentBackend, FragmentListing};

/// Lifecycle operations for fragments over an injected backend.
///
/// The store takes no locks. Concurrent writes to the same `(owner, id)` are
/// last-writer-wins at the backend.
#[derive(Clone)]
pub struct FragmentStore {
    backend: Arc<dyn FragmentBackend>,
}

impl FragmentStore {
    pub fn new(backend: Arc<dyn FragmentBackend>) -> Self {
        Self { backend }
    }

    /// Persist the metadata record, refreshing `updated` first.
    #[instrument(skip_all, fields(owner_id = %fragment.owner_id(), id = %fragment.id()))]
    pub async fn save(&self, fragment: &mut Fragment) -> Result<(), FragmentError> {
        fragment.touch();
        self.backend
            .write_fragment(fragment)
            .await
            .map_err(FragmentError::Store)
    }

    /// Replace the payload and update `size`/`updated` on `fragment`.
    ///
    /// The metadata record is not written; call [`FragmentStore::save`] as well.
    #[instrument(skip_all, fields(owner_id = %fragment.owner_id(), id = %fragment.id(), len = data.len()))]
    pub async fn set_data(&self, fragment: &mut Fragment, data: &[u8]) -> Result<(), FragmentError> {
        self.backend
            .write_fragment_data(fragment.owner_id(), fragment.id(), data)
            .await
            .map_err(FragmentError::Store)?;
        fragment.set_size(data.len() as u64);
        fragment.touch();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_data(&self, owner_id: &str, id: &str) -> Result<Vec<u8>, FragmentError> {
        self.backend
            .read_fragment_data(owner_id, id)
            .await?
            .ok_or_else(|| FragmentError::NotFound(format!("no data found for fragment {id}")))
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, owner_id: &str, id: &str) -> Result<Fragment, FragmentError> {
        self.backend
            .read_fragment(owner_id, id)
            .await?
            .ok_or_else(|| FragmentError::NotFound(format!("fragment {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, FragmentError> {
        let listing = self.backend.list_fragments(owner_id, expand).await?;
        debug!(count = listing.len(), "listed fragments");
        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<(), FragmentError> {
        self.backend.delete_fragment(owner_id, id).await?;
        Ok(())
    }
}
