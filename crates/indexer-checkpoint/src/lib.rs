//! Durable per-consumer checkpoints: the only state a consumer needs to
//! resume after a restart. `Get` defaults to height 0 (genesis) for a
//! consumer that has never committed; `Set` is durable before it returns.

use indexer_types::{Height, IndexerError};

pub trait CheckpointStore: Send + Sync {
    fn get(&self, consumer: &str) -> Result<Height, IndexerError>;
    fn set(&self, consumer: &str, height: Height) -> Result<(), IndexerError>;
}

pub mod adapters;

pub use adapters::kv::KvCheckpointStore;
pub use adapters::memory::InMemoryCheckpointStore;
