//! Checkpoint store backed by any [`KeyValueStore`], so a deployment can
//! keep checkpoints in the same durable store as the block stream.

use crate::CheckpointStore;
use indexer_block_stream::{BatchOperation, KeyValueStore};
use indexer_types::{Height, IndexerError};
use std::sync::Arc;

pub struct KvCheckpointStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> KvCheckpointStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        KvCheckpointStore { store }
    }

    fn key(consumer: &str) -> Vec<u8> {
        format!("checkpoint/{consumer}").into_bytes()
    }
}

impl<S: KeyValueStore> CheckpointStore for KvCheckpointStore<S> {
    fn get(&self, consumer: &str) -> Result<Height, IndexerError> {
        match self.store.get(&Self::key(consumer))? {
            Some(bytes) => {
                let array: [u8; 4] = bytes.try_into().map_err(|_| {
                    IndexerError::StorageFatal(format!(
                        "corrupt checkpoint record for consumer {consumer}"
                    ))
                })?;
                Ok(u32::from_be_bytes(array))
            }
            None => Ok(0),
        }
    }

    fn set(&self, consumer: &str, height: Height) -> Result<(), IndexerError> {
        self.store.atomic_batch_write(vec![BatchOperation::put(
            Self::key(consumer),
            height.to_be_bytes().to_vec(),
        )])
    }
}
