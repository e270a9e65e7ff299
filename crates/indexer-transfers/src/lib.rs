pub mod adapters;
mod extract;
mod ports;

pub use adapters::InMemoryTransferStore;
pub use extract::{extract_transfers, TransferKind};
pub use ports::{TransferRecord, TransferStore};

use indexer_assets::AssetDictionary;
use indexer_chain_client::NetworkProfile;
use indexer_types::{Block, IndexerError, NetworkId};
use std::sync::Arc;

/// Processes a batch of blocks: extracts transfer rows, ensures every
/// discovered asset exists, then performs a single bulk insert. Checkpoint
/// advancement is the caller's (Consumer Runtime's) responsibility, after
/// this returns `Ok`.
pub struct TransfersIndexer<D: AssetDictionary, S: TransferStore> {
    network: NetworkId,
    profile: NetworkProfile,
    assets: Arc<D>,
    store: Arc<S>,
}

impl<D: AssetDictionary, S: TransferStore> TransfersIndexer<D, S> {
    pub fn new(network: NetworkId, profile: NetworkProfile, assets: Arc<D>, store: Arc<S>) -> Self {
        TransfersIndexer {
            network,
            profile,
            assets,
            store,
        }
    }

    pub fn process_batch(&self, blocks: &[Block]) -> Result<usize, IndexerError> {
        let mut rows = Vec::new();
        for block in blocks {
            let transfers = extract_transfers(block, &self.profile);
            for transfer in &transfers {
                if transfer.asset_contract.0.is_empty() {
                    tracing::warn!(
                        extrinsic_id = %transfer.extrinsic_id,
                        asset_symbol = %transfer.asset_symbol,
                        "token transfer has no contract address; recording with an empty contract"
                    );
                }
                self.assets.ensure_exists(
                    self.network,
                    transfer.asset_contract.clone(),
                    &transfer.asset_symbol,
                    self.profile.native_decimals,
                    block.height,
                    block.timestamp,
                )?;
            }
            rows.extend(transfers.into_iter().map(|t| t.into_record(block)));
        }

        if rows.is_empty() {
            return Ok(0);
        }

        let count = rows.len();
        self.store.bulk_insert(rows)?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<D: AssetDictionary, S: TransferStore> indexer_runtime::Indexer for TransfersIndexer<D, S> {
    fn name(&self) -> &'static str {
        "transfers"
    }

    async fn process_batch(&self, blocks: &[Block]) -> Result<usize, IndexerError> {
        TransfersIndexer::process_batch(self, blocks)
    }
}
