use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;

use super::error::StorageError;
use super::traits::{FragmentBackend, FragmentListing};
use crate::fragment::Fragment;

/// An owner-partitioned map that remembers insertion order within each owner.
/// Partitions are dropped once their last entry is removed.
struct MemoryDb<V> {
    partitions: DashMap<String, IndexMap<String, V>>,
}

impl<V: Clone> MemoryDb<V> {
    fn new() -> Self {
        Self {
            partitions: DashMap::new(),
        }
    }

    fn get(&self, primary: &str, secondary: &str) -> Option<V> {
        self.partitions.get(primary)?.get(secondary).cloned()
    }

    fn put(&self, primary: &str, secondary: &str, value: V) {
        self.partitions
            .entry(primary.to_string())
            .or_default()
            .insert(secondary.to_string(), value);
    }

    fn values(&self, primary: &str) -> Vec<V> {
        self.partitions
            .get(primary)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    fn remove(&self, primary: &str, secondary: &str) -> Option<V> {
        let removed = self.partitions.get_mut(primary)?.shift_remove(secondary);
        self.partitions
            .remove_if(primary, |_, entries| entries.is_empty());
        removed
    }
}

/// In-process backend. Contents live as long as the value does.
pub struct MemoryBackend {
    metadata: MemoryDb<Fragment>,
    data: MemoryDb<Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            metadata: MemoryDb::new(),
            data: MemoryDb::new(),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FragmentBackend for MemoryBackend {
    async fn write_fragment(&self, fragment: &Fragment) -> Result<(), StorageError> {
        self.metadata
            .put(fragment.owner_id(), fragment.id(), fragment.clone());
        Ok(())
    }

    async fn read_fragment(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Fragment>, StorageError> {
        Ok(self.metadata.get(owner_id, id))
    }

    async fn write_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        self.data.put(owner_id, id, data.to_vec());
        Ok(())
    }

    async fn read_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.get(owner_id, id))
    }

    async fn list_fragments(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, StorageError> {
        Ok(FragmentListing::from_fragments(
            self.metadata.values(owner_id),
            expand,
        ))
    }

    async fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        let data = self.data.remove(owner_id, id);
        match self.metadata.remove(owner_id, id) {
            Some(_) => Ok(()),
            None => {
                if data.is_some() {
                    tracing::warn!(owner_id, id, "removed payload without metadata");
                }
                Err(StorageError::not_found(owner_id, id))
            }
        }
    }
}
