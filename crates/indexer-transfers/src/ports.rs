use indexer_types::{Address, Amount, AssetContract, Height, IndexerError};

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub extrinsic_id: String,
    pub event_idx: u32,
    pub block_height: Height,
    pub block_timestamp: u64,
    pub from: Address,
    pub to: Address,
    pub asset_symbol: String,
    pub asset_contract: AssetContract,
    pub amount: Amount,
    pub fee: Amount,
    pub version: u64,
}

/// Outbound port for the columnar transfers store. `bulk_insert` is the
/// sole write path: every row in a call either becomes durable together, or
/// none does, keyed by `(extrinsic_id, event_idx, asset)` with
/// monotonically increasing version on conflict.
pub trait TransferStore: Send + Sync {
    fn bulk_insert(&self, rows: Vec<TransferRecord>) -> Result<(), IndexerError>;
}
