use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{FragmentBackend, FragmentListing};
use crate::fragment::Fragment;

const METADATA_EXT: &str = "json";
const DATA_EXT: &str = "bin";
const MAX_KEY_LEN: usize = 128;

/// Filesystem-backed fragment store.
///
/// Records are laid out per owner:
/// `{base_path}/{owner_id}/{id}.json` holds metadata and
/// `{base_path}/{owner_id}/{id}.bin` holds the payload.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend rooted at `base_path`.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path })
    }

    fn owner_dir(&self, owner_id: &str) -> Result<PathBuf, StorageError> {
        Ok(self.base_path.join(checked_key(owner_id)?))
    }

    fn record_path(&self, owner_id: &str, id: &str, ext: &str) -> Result<PathBuf, StorageError> {
        let id = checked_key(id)?;
        Ok(self.owner_dir(owner_id)?.join(format!("{id}.{ext}")))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Write through a temp file and rename so readers never see a partial record.
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Owner ids and fragment ids become path segments, so only a safe alphabet is allowed.
fn checked_key(key: &str) -> Result<&str, StorageError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(key)
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl FragmentBackend for FilesystemBackend {
    async fn write_fragment(&self, fragment: &Fragment) -> Result<(), StorageError> {
        let path = self.record_path(fragment.owner_id(), fragment.id(), METADATA_EXT)?;
        let json = serde_json::to_vec(fragment)?;
        self.write_atomic(&path, &json).await
    }

    async fn read_fragment(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Fragment>, StorageError> {
        let Ok(path) = self.record_path(owner_id, id, METADATA_EXT) else {
            return Ok(None);
        };
        match self.read_optional(&path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let path = self.record_path(owner_id, id, DATA_EXT)?;
        self.write_atomic(&path, data).await
    }

    async fn read_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let Ok(path) = self.record_path(owner_id, id, DATA_EXT) else {
            return Ok(None);
        };
        self.read_optional(&path).await
    }

    async fn list_fragments(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, StorageError> {
        let Ok(dir) = self.owner_dir(owner_id) else {
            return Ok(FragmentListing::from_fragments(Vec::new(), expand));
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FragmentListing::from_fragments(Vec::new(), expand));
            }
            Err(e) => return Err(e.into()),
        };

        let mut fragments = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(METADATA_EXT) {
                continue;
            }
            let bytes = fs::read(&path).await?;
            fragments.push(serde_json::from_slice::<Fragment>(&bytes)?);
        }

        // Directory order is arbitrary; creation order is what callers expect.
        fragments.sort_by(|a, b| {
            a.created()
                .cmp(&b.created())
                .then_with(|| a.id().cmp(b.id()))
        });

        Ok(FragmentListing::from_fragments(fragments, expand))
    }

    async fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        let (Ok(metadata_path), Ok(data_path)) = (
            self.record_path(owner_id, id, METADATA_EXT),
            self.record_path(owner_id, id, DATA_EXT),
        ) else {
            return Err(StorageError::not_found(owner_id, id));
        };

        match fs::remove_file(&data_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(&metadata_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(owner_id, id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
