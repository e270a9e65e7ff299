//! In-memory [`TransferStore`]: bulk inserts are all-or-nothing against a
//! single lock, keyed by `(extrinsic_id, event_idx, asset)` with
//! monotonically increasing version on conflict.

use crate::ports::{TransferRecord, TransferStore};
use indexer_types::{AssetContract, IndexerError};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryTransferStore {
    rows: RwLock<HashMap<(String, u32, AssetContract), TransferRecord>>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        InMemoryTransferStore::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(
        &self,
        extrinsic_id: &str,
        event_idx: u32,
        asset: &AssetContract,
    ) -> Option<TransferRecord> {
        self.rows
            .read()
            .get(&(extrinsic_id.to_string(), event_idx, asset.clone()))
            .cloned()
    }

    pub fn all(&self) -> Vec<TransferRecord> {
        self.rows.read().values().cloned().collect()
    }
}

impl TransferStore for InMemoryTransferStore {
    fn bulk_insert(&self, rows: Vec<TransferRecord>) -> Result<(), IndexerError> {
        let mut table = self.rows.write();
        for mut row in rows {
            let key = (row.extrinsic_id.clone(), row.event_idx, row.asset_contract.clone());
            row.version = table.get(&key).map(|existing| existing.version + 1).unwrap_or(0);
            table.insert(key, row);
        }
        Ok(())
    }
}
