use super::{AccumulatorId, AccumulatorRecord, AccumulatorStore, StorageError};
use async_trait::async_trait;
use cosmian_crypto_core::bytes_ser_de::Serializable;
use dashmap::DashMap;
use std::sync::Arc;
use zeroize::Zeroizing;

/// In-process store keeping every record in its encoded form.
#[derive(Default, Clone)]
pub struct MemoryAccumulatorStore {
    db: Arc<DashMap<AccumulatorId, Zeroizing<Vec<u8>>>>,
}

impl std::fmt::Debug for MemoryAccumulatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAccumulatorStore").field("records", &self.db.len()).finish()
    }
}

impl MemoryAccumulatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.db.clear();
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

#[async_trait]
impl AccumulatorStore for MemoryAccumulatorStore {
    async fn load(&self, id: &AccumulatorId) -> Result<Option<AccumulatorRecord>, StorageError> {
        match self.db.get(id) {
            Some(bytes) => Ok(Some(AccumulatorRecord::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        id: &AccumulatorId,
        record: &AccumulatorRecord,
    ) -> Result<(), StorageError> {
        let bytes = record.serialize()?;
        self.db.insert(*id, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{self, Element};
    use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};

    #[tokio::test]
    async fn test_read_your_writes() {
        let store = MemoryAccumulatorStore::new();
        let id = AccumulatorId::level(2);
        assert_eq!(store.load(&id).await.unwrap(), None);

        let (sk, pk, acc) = accumulator::create(b"level/2", &mut CsRng::from_entropy()).unwrap();
        let mut record = AccumulatorRecord::new(sk, pk, acc);
        store.save(&id, &record).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), Some(record.clone()));

        let y = Element::hash(b"user");
        record.accumulator = record.accumulator.add(&record.secret_key, &y).unwrap().0;
        record.members.insert(y.to_bytes());
        store.save(&id, &record).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap(), Some(record));
        assert_eq!(store.load(&AccumulatorId::department(2)).await.unwrap(), None);
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }
}
