//! Durable [`KeyValueStore`] backed by RocksDB: Snappy compression, bloom
//! filters, and a `WriteBatch` as the atomic_batch_write boundary.

use crate::ports::{BatchOperation, KeyValueStore};
use indexer_types::IndexerError;
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    pub path: String,
    pub block_cache_bytes: usize,
    pub write_buffer_bytes: usize,
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        RocksDbConfig {
            path: "./data/block-stream".to_string(),
            block_cache_bytes: 256 * 1024 * 1024,
            write_buffer_bytes: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

pub struct RocksDbStore {
    db: RwLock<DB>,
    sync_writes: bool,
}

impl RocksDbStore {
    pub fn open(config: RocksDbConfig) -> Result<Self, IndexerError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_bytes);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_bytes));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, Path::new(&config.path))
            .map_err(|e| IndexerError::StorageFatal(format!("open rocksdb at {}: {e}", config.path)))?;

        Ok(RocksDbStore {
            db: RwLock::new(db),
            sync_writes: config.sync_writes,
        })
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, IndexerError> {
        let db = self.db.read().expect("rocksdb lock poisoned");
        db.get(key)
            .map_err(|e| IndexerError::StorageTransient(format!("rocksdb get: {e}")))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), IndexerError> {
        let db = self.db.write().expect("rocksdb lock poisoned");
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
            }
        }

        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        db.write_opt(batch, &write_opts)
            .map_err(|e| IndexerError::StorageTransient(format!("rocksdb batch write: {e}")))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, IndexerError> {
        let db = self.db.read().expect("rocksdb lock poisoned");
        let mut results = Vec::new();
        for item in db.iterator(IteratorMode::From(prefix, rocksdb::Direction::Forward)) {
            let (key, value) = item
                .map_err(|e| IndexerError::StorageTransient(format!("rocksdb scan: {e}")))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }
}
