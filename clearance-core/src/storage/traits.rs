use super::{AccumulatorId, AccumulatorRecord, StorageError};
use async_trait::async_trait;

/// Durable home of every accumulator record.
///
/// Implementations must offer read-your-writes per key: a `load` issued after a
/// successful `save` on the same [`AccumulatorId`] observes that save.
/// Cross-key atomicity is not required; the authorization service compensates
/// for partial failures itself.
#[async_trait]
pub trait AccumulatorStore: Send + Sync {
    /// `Ok(None)` means the accumulator was never created.
    async fn load(&self, id: &AccumulatorId) -> Result<Option<AccumulatorRecord>, StorageError>;

    async fn save(&self, id: &AccumulatorId, record: &AccumulatorRecord)
    -> Result<(), StorageError>;
}
