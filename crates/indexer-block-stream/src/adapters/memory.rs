//! In-memory [`KeyValueStore`], used by tests and by `--network dev` runs
//! that don't need durability across restarts.

use crate::ports::{BatchOperation, KeyValueStore};
use indexer_types::IndexerError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, IndexerError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), IndexerError> {
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
            }
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, IndexerError> {
        Ok(self
            .data
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
