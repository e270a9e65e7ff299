//! Chain state queries for balance snapshots, used by the Balance Series
//! Indexer at the last block of each closed period. Kept as its own trait
//! rather than folded into [`crate::ChainClient`]: the base chain client
//! surface covers just block/head fetches, and balance queries are an
//! additional chain-state read the series indexer needs.

use async_trait::async_trait;
use indexer_types::{Address, AssetContract, BalanceSnapshot, Height, IndexerError};
use std::collections::HashMap;

#[async_trait]
pub trait BalanceStateQuery: Send + Sync {
    /// Snapshots `(free, reserved, staked)` for every `(address, asset)`
    /// pair in `addresses x assets`, as of `height`. Pairs with no on-chain
    /// presence are omitted rather than zero-filled; callers treat a
    /// missing pair as all-zero.
    async fn query_balances(
        &self,
        height: Height,
        addresses: &[Address],
        assets: &[AssetContract],
    ) -> Result<HashMap<(Address, AssetContract), BalanceSnapshot>, IndexerError>;
}
