use crate::ports::{BalanceSeriesRecord, BalanceSeriesStore};
use indexer_types::{Address, AssetContract, IndexerError};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryBalanceSeriesStore {
    // (address, asset) -> records ordered by period_start ascending.
    records: RwLock<HashMap<(Address, AssetContract), Vec<BalanceSeriesRecord>>>,
}

impl InMemoryBalanceSeriesStore {
    pub fn new() -> Self {
        InMemoryBalanceSeriesStore::default()
    }

    pub fn all_for(&self, address: &Address, asset: &AssetContract) -> Vec<BalanceSeriesRecord> {
        self.records
            .read()
            .get(&(address.clone(), asset.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

impl BalanceSeriesStore for InMemoryBalanceSeriesStore {
    fn latest_before(
        &self,
        address: &Address,
        asset: &AssetContract,
        before_period_start: u64,
    ) -> Result<Option<BalanceSeriesRecord>, IndexerError> {
        let records = self.records.read();
        let key = (address.clone(), asset.clone());
        Ok(records
            .get(&key)
            .and_then(|rows| rows.iter().rev().find(|r| r.period_start < before_period_start))
            .cloned())
    }

    fn upsert(&self, record: BalanceSeriesRecord) -> Result<(), IndexerError> {
        let key = (record.address.clone(), record.asset_contract.clone());
        let mut records = self.records.write();
        let rows = records.entry(key).or_default();
        match rows.iter().position(|r| r.period_start == record.period_start) {
            Some(idx) => rows[idx] = record,
            None => {
                rows.push(record);
                rows.sort_by_key(|r| r.period_start);
            }
        }
        Ok(())
    }
}
