//! Concrete [`SchemaTarget`]s for this deployment's destination stores.
//! Applied once at startup, before any Consumer Runtime loop starts.

use indexer_schema::{ChunkOutcome, DdlChunk, SchemaTarget};
use indexer_types::IndexerError;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Tracks which DDL chunks have already been applied against a given
/// destination. Real backends detect this via `IF NOT EXISTS` or a catalog
/// lookup; every store here is in-process, so the applied set itself is
/// the record of what already exists.
pub struct StaticDdlTarget {
    name: &'static str,
    chunks: Vec<DdlChunk>,
    applied: Mutex<HashSet<String>>,
}

impl StaticDdlTarget {
    fn new(name: &'static str, chunks: Vec<DdlChunk>) -> Self {
        StaticDdlTarget {
            name,
            chunks,
            applied: Mutex::new(HashSet::new()),
        }
    }
}

impl SchemaTarget for StaticDdlTarget {
    fn target_name(&self) -> &'static str {
        self.name
    }

    fn ddl_chunks(&self) -> Vec<DdlChunk> {
        self.chunks.clone()
    }

    fn apply_chunk(&self, chunk: &DdlChunk) -> Result<ChunkOutcome, IndexerError> {
        let mut applied = self.applied.lock();
        if applied.insert(chunk.object_name.clone()) {
            Ok(ChunkOutcome::Created)
        } else {
            Ok(ChunkOutcome::AlreadyPresent)
        }
    }
}

pub fn block_stream_target() -> StaticDdlTarget {
    StaticDdlTarget::new(
        "block-stream",
        vec![DdlChunk::new("blocks_partition_index", "CREATE TABLE IF NOT EXISTS blocks (...)")],
    )
}

pub fn columnar_target() -> StaticDdlTarget {
    StaticDdlTarget::new(
        "columnar-store",
        vec![
            DdlChunk::new("transfers", "CREATE TABLE IF NOT EXISTS transfers (...)"),
            DdlChunk::new("balance_series", "CREATE TABLE IF NOT EXISTS balance_series (...)"),
            DdlChunk::new("assets", "CREATE TABLE IF NOT EXISTS assets (...)"),
        ],
    )
}

pub fn graph_target() -> StaticDdlTarget {
    StaticDdlTarget::new(
        "graph-store",
        vec![
            DdlChunk::new("address_nodes", "CREATE (:Address) INDEX IF NOT EXISTS"),
            DdlChunk::new("transfer_edges", "CREATE (:TRANSFERS_TO) INDEX IF NOT EXISTS"),
        ],
    )
}
