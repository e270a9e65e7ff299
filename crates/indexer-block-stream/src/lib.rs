pub mod adapters;
pub mod ports;
mod store;

pub use indexer_partition::{Partitioner, DEFAULT_PARTITION_SIZE};
pub use ports::{BatchOperation, KeyValueStore};
pub use store::BlockStreamStore;
