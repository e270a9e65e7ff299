use indexer_types::{Address, Amount, AssetContract, Height, IndexerError};

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSeriesRecord {
    pub period_start: u64,
    pub period_end: u64,
    pub block_height: Height,
    pub address: Address,
    pub asset_contract: AssetContract,
    pub asset_symbol: String,
    pub free: Amount,
    pub reserved: Amount,
    pub staked: Amount,
    pub total: Amount,
    pub delta_free: Amount,
    pub delta_reserved: Amount,
    pub delta_staked: Amount,
    pub delta_total: Amount,
    pub percent_change_total: f64,
}

/// Outbound port for the columnar balance-series store. Keyed by
/// `(period_start, address, asset)`; written once per closed period.
pub trait BalanceSeriesStore: Send + Sync {
    /// The most recent record for `(address, asset)` with
    /// `period_start < before_period_start`, if any — used to compute
    /// deltas for the period currently being closed.
    fn latest_before(
        &self,
        address: &Address,
        asset: &AssetContract,
        before_period_start: u64,
    ) -> Result<Option<BalanceSeriesRecord>, IndexerError>;

    fn upsert(&self, record: BalanceSeriesRecord) -> Result<(), IndexerError>;
}
