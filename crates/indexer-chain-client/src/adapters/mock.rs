//! In-memory [`ChainClient`] test double: a fixed, ordered set of blocks the
//! tests hand in up front, returned by height.

use crate::balances::BalanceStateQuery;
use crate::ChainClient;
use async_trait::async_trait;
use indexer_types::{Address, AssetContract, BalanceSnapshot, Block, Height, IndexerError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

pub struct MockChainClient {
    blocks: Mutex<BTreeMap<Height, Block>>,
    /// Balances keyed by `(height, address, asset)`; tests pre-seed the
    /// exact snapshots `query_balances` should return at a given height.
    balances: Mutex<HashMap<(Height, Address, AssetContract), BalanceSnapshot>>,
}

impl MockChainClient {
    pub fn new(blocks: Vec<Block>) -> Self {
        let blocks = blocks.into_iter().map(|b| (b.height, b)).collect();
        MockChainClient {
            blocks: Mutex::new(blocks),
            balances: Mutex::new(HashMap::new()),
        }
    }

    pub fn push(&self, block: Block) {
        self.blocks.lock().unwrap().insert(block.height, block);
    }

    /// Registers the balance snapshot `query_balances` should return for
    /// `(address, asset)` at `height`.
    pub fn set_balance(
        &self,
        height: Height,
        address: Address,
        asset: AssetContract,
        snapshot: BalanceSnapshot,
    ) {
        self.balances
            .lock()
            .unwrap()
            .insert((height, address, asset), snapshot);
    }
}

#[async_trait]
impl BalanceStateQuery for MockChainClient {
    async fn query_balances(
        &self,
        height: Height,
        addresses: &[Address],
        assets: &[AssetContract],
    ) -> Result<HashMap<(Address, AssetContract), BalanceSnapshot>, IndexerError> {
        let balances = self.balances.lock().unwrap();
        let mut result = HashMap::new();
        for address in addresses {
            for asset in assets {
                if let Some(snapshot) = balances.get(&(height, address.clone(), asset.clone())) {
                    result.insert((address.clone(), asset.clone()), *snapshot);
                }
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn finalized_head(&self) -> Result<Height, IndexerError> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }

    async fn fetch_blocks(&self, start: Height, count: u32) -> Result<Vec<Block>, IndexerError> {
        let blocks = self.blocks.lock().unwrap();
        let result = (start..start.saturating_add(count))
            .filter_map(|h| blocks.get(&h).cloned())
            .collect();
        Ok(result)
    }
}
