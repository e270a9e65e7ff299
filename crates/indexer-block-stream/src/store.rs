//! The canonical, append-only block stream: height-partitioned, atomic per
//! batch, idempotent on same-height rewrite, CRC32-checked on read.

use crate::ports::{BatchOperation, KeyValueStore};
use indexer_partition::Partitioner;
use indexer_types::{Block, Height, IndexerError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const MAX_HEIGHT_KEY: &[u8] = b"meta/max_height";

#[derive(Debug, Serialize, Deserialize)]
struct VersionedBlock {
    version: u64,
    block: Block,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    checksum: u32,
    payload: Vec<u8>,
}

fn block_key(partitioner: &Partitioner, height: Height) -> Vec<u8> {
    let partition = partitioner.partition_of(height);
    format!("blk/{partition:010}/{height:010}").into_bytes()
}

fn encode_record(versioned: &VersionedBlock) -> Result<Vec<u8>, IndexerError> {
    let payload = bincode::serialize(versioned)
        .map_err(|e| IndexerError::StorageFatal(format!("encode block: {e}")))?;
    let checksum = crc32fast::hash(&payload);
    bincode::serialize(&StoredRecord { checksum, payload })
        .map_err(|e| IndexerError::StorageFatal(format!("encode record: {e}")))
}

fn decode_record(bytes: &[u8]) -> Result<VersionedBlock, IndexerError> {
    let record: StoredRecord = bincode::deserialize(bytes)
        .map_err(|e| IndexerError::StorageFatal(format!("corrupt block record: {e}")))?;
    if crc32fast::hash(&record.payload) != record.checksum {
        return Err(IndexerError::StorageFatal(
            "block record failed checksum verification".into(),
        ));
    }
    bincode::deserialize(&record.payload)
        .map_err(|e| IndexerError::StorageFatal(format!("corrupt block record: {e}")))
}

pub struct BlockStreamStore<S: KeyValueStore> {
    store: Arc<S>,
    partitioner: Partitioner,
    // Cached in-process for the fast path; the durable source of truth is
    // `MAX_HEIGHT_KEY` in `store`.
    max_height_cache: AtomicU32,
    max_height_known: std::sync::atomic::AtomicBool,
}

impl<S: KeyValueStore> BlockStreamStore<S> {
    pub fn new(store: Arc<S>, partitioner: Partitioner) -> Result<Self, IndexerError> {
        let this = BlockStreamStore {
            store,
            partitioner,
            max_height_cache: AtomicU32::new(0),
            max_height_known: std::sync::atomic::AtomicBool::new(false),
        };
        this.load_max_height()?;
        Ok(this)
    }

    fn load_max_height(&self) -> Result<(), IndexerError> {
        if let Some(bytes) = self.store.get(MAX_HEIGHT_KEY)? {
            let height = u32::from_be_bytes(bytes.try_into().map_err(|_| {
                IndexerError::StorageFatal("corrupt max_height metadata record".into())
            })?);
            self.max_height_cache.store(height, Ordering::SeqCst);
            self.max_height_known.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Appends a batch of blocks. Either every height in `batch` becomes
    /// visible, or none does. A height already present is either an
    /// idempotent no-op (identical block) or a deterministic supersede
    /// (monotonically increasing version) — never a silent partial write.
    pub fn append(&self, batch: &[Block]) -> Result<(), IndexerError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut operations = Vec::with_capacity(batch.len() + 1);
        let mut new_max = self.max_height().unwrap_or(0);
        let mut any_change = false;

        for block in batch {
            let key = block_key(&self.partitioner, block.height);
            let existing = self.store.get(&key)?;

            let next_version = match &existing {
                None => 0,
                Some(bytes) => {
                    let existing = decode_record(bytes)?;
                    if &existing.block == block {
                        continue; // identical re-append: idempotent no-op.
                    }
                    existing.version + 1
                }
            };

            let versioned = VersionedBlock {
                version: next_version,
                block: block.clone(),
            };
            let encoded = encode_record(&versioned)?;
            operations.push(BatchOperation::put(key, encoded));
            new_max = new_max.max(block.height);
            any_change = true;
        }

        if !any_change {
            return Ok(());
        }

        operations.push(BatchOperation::put(
            MAX_HEIGHT_KEY.to_vec(),
            new_max.to_be_bytes().to_vec(),
        ));

        self.store.atomic_batch_write(operations)?;
        self.max_height_cache.store(new_max, Ordering::SeqCst);
        self.max_height_known.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Contiguous read over `[start, end]`. Gaps within the requested range
    /// indicate heights that were never appended; callers should not expect
    /// gaps for any range below `max_height()`.
    pub fn range(&self, start: Height, end: Height) -> Result<Vec<Block>, IndexerError> {
        let mut blocks = Vec::new();
        for height in start..=end {
            let key = block_key(&self.partitioner, height);
            match self.store.get(&key)? {
                Some(bytes) => {
                    let versioned = decode_record(&bytes)?;
                    blocks.push(versioned.block);
                }
                None => break,
            }
        }
        Ok(blocks)
    }

    pub fn max_height(&self) -> Result<Height, IndexerError> {
        if self.max_height_known.load(Ordering::SeqCst) {
            return Ok(self.max_height_cache.load(Ordering::SeqCst));
        }
        Ok(0)
    }
}
