/// Failure reported by an [`AccumulatorStore`](super::AccumulatorStore).
///
/// Every variant is transient from the caller's point of view; the
/// authorization service surfaces them unchanged so the operation can be
/// retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    NotFound(String),

    Transaction(String),

    Connection(String),

    Other(String),
}

impl std::error::Error for StorageError {}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Connection(inner) => {
                write!(f, "Storage connection: {inner}")
            },
            StorageError::Transaction(inner) => {
                write!(f, "Transaction: {inner}")
            },
            StorageError::NotFound(inner) => {
                write!(f, "Data not found: {inner}")
            },
            StorageError::Other(inner) => {
                write!(f, "Other storage error: {inner}")
            },
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            _ => StorageError::Connection(e.to_string()),
        }
    }
}

impl From<crate::accumulator::Error> for StorageError {
    fn from(e: crate::accumulator::Error) -> Self {
        StorageError::Other(format!("corrupt accumulator record: {e}"))
    }
}
