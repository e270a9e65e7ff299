use crate::CheckpointStore;
use indexer_types::{Height, IndexerError};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryCheckpointStore {
    heights: RwLock<HashMap<String, Height>>,
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn get(&self, consumer: &str) -> Result<Height, IndexerError> {
        Ok(self.heights.read().get(consumer).copied().unwrap_or(0))
    }

    fn set(&self, consumer: &str, height: Height) -> Result<(), IndexerError> {
        self.heights.write().insert(consumer.to_string(), height);
        Ok(())
    }
}
