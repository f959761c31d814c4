use super::{AccumulatorId, AccumulatorRecord, AccumulatorStore, StorageError};
use crate::log::debug;
use async_trait::async_trait;
use cosmian_crypto_core::bytes_ser_de::Serializable;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "acc";

/// Store keeping one `<value>_<kind>.acc` file per accumulator under a root
/// directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-save leaves the previous record intact.
#[derive(Clone, Debug)]
pub struct DirectoryAccumulatorStore {
    root: PathBuf,
}

impl DirectoryAccumulatorStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, id: &AccumulatorId) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}"))
    }
}

#[async_trait]
impl AccumulatorStore for DirectoryAccumulatorStore {
    async fn load(&self, id: &AccumulatorId) -> Result<Option<AccumulatorRecord>, StorageError> {
        let bytes = match tokio::fs::read(self.path_of(id)).await {
            Ok(bytes) => zeroize::Zeroizing::new(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(AccumulatorRecord::deserialize(&bytes)?))
    }

    async fn save(
        &self,
        id: &AccumulatorId,
        record: &AccumulatorRecord,
    ) -> Result<(), StorageError> {
        let bytes = record.serialize()?;
        let path = self.path_of(id);
        let tmp = self.root.join(format!(".{id}.{EXTENSION}.tmp"));

        tokio::fs::write(&tmp, &bytes[..]).await?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::Transaction(format!("{}: {e}", path.display())))?;

        debug!(accumulator = %id, bytes = bytes.len(), "accumulator record written");
        Ok(())
    }
}
