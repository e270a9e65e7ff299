//! Outbound ports: the key-value substrate the block stream store is built
//! on, generalized from this workspace's block-storage key-value port.

use indexer_types::IndexerError;

#[derive(Debug, Clone)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Abstract interface for key-value storage. `atomic_batch_write` is the
/// sole atomicity boundary: either every operation in the batch is visible
/// or none is.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, IndexerError>;
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), IndexerError>;
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, IndexerError>;
}
