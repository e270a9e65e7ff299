//! Balance Series Indexer: materializes periodic per-address balance
//! snapshots with deltas against the previous period.
//!
//! Periods are closed strictly in ascending block order as blocks cross a
//! period boundary; an open period keeps accumulating addresses until a
//! later batch produces a block past its end, at which point it is
//! materialized using the chain state at that period's *last* block.
//! Checkpoint advancement (the caller's responsibility, once this returns
//! `Ok`) always tracks the last *block height* processed, not the period
//! end — an open trailing period is simply picked back up on the next call.

mod adapters;
mod period;
mod ports;

pub use adapters::InMemoryBalanceSeriesStore;
pub use period::{period_end_for, period_start_for, DEFAULT_PERIOD_MS};
pub use ports::{BalanceSeriesRecord, BalanceSeriesStore};

use indexer_assets::AssetDictionary;
use indexer_chain_client::{BalanceStateQuery, NetworkProfile};
use indexer_types::{Address, AssetContract, Block, Height, IndexerError, NetworkId};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// An open, not-yet-materialized period window: the set of addresses
/// touched so far and the last block seen within it.
struct OpenWindow {
    period_start: u64,
    addresses: BTreeSet<Address>,
    last_height: Height,
}

pub struct BalanceSeriesIndexer<Q: BalanceStateQuery, D: AssetDictionary, S: BalanceSeriesStore> {
    network: NetworkId,
    profile: NetworkProfile,
    period_length_ms: u64,
    watched_assets: Vec<AssetContract>,
    chain: Arc<Q>,
    assets: Arc<D>,
    store: Arc<S>,
    open: Mutex<Option<OpenWindow>>,
}

impl<Q: BalanceStateQuery, D: AssetDictionary, S: BalanceSeriesStore> BalanceSeriesIndexer<Q, D, S> {
    pub fn new(
        network: NetworkId,
        profile: NetworkProfile,
        period_length_ms: u64,
        watched_assets: Vec<AssetContract>,
        chain: Arc<Q>,
        assets: Arc<D>,
        store: Arc<S>,
    ) -> Self {
        BalanceSeriesIndexer {
            network,
            profile,
            period_length_ms,
            watched_assets,
            chain,
            assets,
            store,
            open: Mutex::new(None),
        }
    }

    /// Processes a batch of blocks in ascending height order, closing every
    /// period the batch crosses and leaving a trailing period open for the
    /// next call. Returns the number of (address, asset) records written.
    pub async fn process_batch(&self, blocks: &[Block]) -> Result<usize, IndexerError> {
        let mut written = 0usize;

        for block in blocks {
            let period_start =
                period_start_for(block.timestamp, self.profile.period_epoch_ms, self.period_length_ms);

            let to_close = {
                let mut open = self.open.lock();
                match open.as_mut() {
                    None => {
                        *open = Some(OpenWindow {
                            period_start,
                            addresses: block.addresses.clone(),
                            last_height: block.height,
                        });
                        None
                    }
                    Some(window) if window.period_start == period_start => {
                        window.addresses.extend(block.addresses.iter().cloned());
                        window.last_height = block.height;
                        None
                    }
                    Some(window) => {
                        // This block belongs to a later period: the
                        // currently open one is now closed.
                        let closed = OpenWindow {
                            period_start: window.period_start,
                            addresses: std::mem::take(&mut window.addresses),
                            last_height: window.last_height,
                        };
                        window.period_start = period_start;
                        window.addresses = block.addresses.clone();
                        window.last_height = block.height;
                        Some(closed)
                    }
                }
            };

            if let Some(window) = to_close {
                written += self.materialize_period(window).await?;
            }
        }

        Ok(written)
    }

    async fn materialize_period(&self, window: OpenWindow) -> Result<usize, IndexerError> {
        if window.addresses.is_empty() {
            return Ok(0);
        }
        let addresses: Vec<Address> = window.addresses.into_iter().collect();
        let period_end = period_end_for(window.period_start, self.period_length_ms);

        let snapshots = self
            .chain
            .query_balances(window.last_height, &addresses, &self.watched_assets)
            .await?;

        let mut written = 0usize;
        for asset in &self.watched_assets {
            for address in &addresses {
                let Some(snapshot) = snapshots.get(&(address.clone(), asset.clone())) else {
                    continue;
                };

                self.assets.ensure_exists(
                    self.network,
                    asset.clone(),
                    &self.asset_symbol(asset),
                    self.profile.native_decimals,
                    window.last_height,
                    window.period_start,
                )?;

                let prior = self
                    .store
                    .latest_before(address, asset, window.period_start)?;

                let (delta_free, delta_reserved, delta_staked, delta_total, percent_change) =
                    match &prior {
                        Some(p) => (
                            snapshot.free - p.free,
                            snapshot.reserved - p.reserved,
                            snapshot.staked - p.staked,
                            snapshot.total() - p.total,
                            p.total.percent_change_to(snapshot.total()),
                        ),
                        None => (
                            snapshot.free,
                            snapshot.reserved,
                            snapshot.staked,
                            snapshot.total(),
                            0.0,
                        ),
                    };

                self.store.upsert(BalanceSeriesRecord {
                    period_start: window.period_start,
                    period_end,
                    block_height: window.last_height,
                    address: address.clone(),
                    asset_contract: asset.clone(),
                    asset_symbol: self.asset_symbol(asset),
                    free: snapshot.free,
                    reserved: snapshot.reserved,
                    staked: snapshot.staked,
                    total: snapshot.total(),
                    delta_free,
                    delta_reserved,
                    delta_staked,
                    delta_total,
                    percent_change_total: percent_change,
                })?;
                written += 1;
            }
        }

        Ok(written)
    }

    fn asset_symbol(&self, asset: &AssetContract) -> String {
        if asset.is_native() {
            self.profile.network.native_symbol().to_string()
        } else {
            asset.0.clone()
        }
    }
}

#[async_trait::async_trait]
impl<Q: BalanceStateQuery, D: AssetDictionary, S: BalanceSeriesStore> indexer_runtime::Indexer
    for BalanceSeriesIndexer<Q, D, S>
{
    fn name(&self) -> &'static str {
        "balance-series"
    }

    async fn process_batch(&self, blocks: &[Block]) -> Result<usize, IndexerError> {
        BalanceSeriesIndexer::process_batch(self, blocks).await
    }
}
