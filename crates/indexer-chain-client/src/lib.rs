//! Chain-neutral block/event fetching.
//!
//! [`ChainClient`] is the only port the rest of the pipeline sees; chain
//! specifics (RPC shapes, per-network decimal counts, synthetic transfer
//! events) live behind [`adapters::subxt_client::SubxtChainClient`] and
//! [`NetworkProfile`].

pub mod adapters;
pub mod balances;
pub mod profile;

pub use balances::BalanceStateQuery;
pub use profile::{NetworkProfile, SyntheticTransferKind};

use async_trait::async_trait;
use indexer_types::{Block, Height, IndexerError};

/// Fetches blocks/events by height range from a chain node and exposes the
/// finalized head.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest finalized block height. `Err(ChainUnavailable)` on transport
    /// error.
    async fn finalized_head(&self) -> Result<Height, IndexerError>;

    /// Up to `count` contiguous, fully populated blocks starting at `start`.
    /// Missing/unfinalized heights yield a short result, not an error.
    async fn fetch_blocks(&self, start: Height, count: u32) -> Result<Vec<Block>, IndexerError>;
}
