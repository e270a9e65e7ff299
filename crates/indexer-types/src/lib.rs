//! Canonical domain types for the blockchain analytics indexing platform.
//!
//! Every downstream crate (chain client, block stream, the four indexers,
//! the consumer runtime) depends on this crate as the single source of
//! truth for the shapes flowing through the pipeline.

pub mod amount;
pub mod balance;
pub mod block;
pub mod errors;
pub mod ids;

pub use amount::Amount;
pub use balance::BalanceSnapshot;
pub use block::{Block, Event, Extrinsic, ExtrinsicStatus, Height};
pub use errors::{ErrorClass, IndexerError};
pub use ids::{Address, AssetContract, NetworkId, NATIVE_ASSET_CONTRACT};
