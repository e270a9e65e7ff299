use indexer_types::{Address, Amount, AssetContract, Height, IndexerError};
use std::collections::{BTreeSet, HashMap};

/// A 6-float network embedding: `(transfer_count, unique_senders,
/// unique_receivers, neighbor_count, community_id, community_page_rank)`,
/// null-coalesced to `0.0`.
pub type Embedding = [f64; 6];

#[derive(Debug, Clone, PartialEq)]
pub struct AddressNode {
    pub address: Address,
    pub first_activity_height: Height,
    pub first_activity_timestamp: u64,
    pub last_activity_height: Height,
    pub last_activity_timestamp: u64,
    /// Distinct counterparties, either direction, any asset.
    pub neighbor_count: u64,
    pub unique_senders: u64,
    pub unique_receivers: u64,
    pub transfer_count: u64,
    pub community_id: Option<u64>,
    pub community_page_rank: Option<f64>,
    pub network_embedding: Option<Embedding>,
    pub labels: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferEdge {
    pub from: Address,
    pub to: Address,
    pub asset: AssetContract,
    pub volume: Amount,
    pub transfer_count: u64,
    pub first_activity_height: Height,
    pub first_activity_timestamp: u64,
    pub last_activity_height: Height,
    pub last_activity_timestamp: u64,
}

/// Outbound port for the money-flow property graph. `record_transfer` is
/// the single per-block mutation entry point: it upserts both endpoint
/// nodes and the aggregated `(from,to,asset)` edge, and is the sole place
/// `neighbor_count`/`unique_senders`/`unique_receivers` are maintained.
/// Periodic analytics results are applied in bulk via the `apply_*` methods.
pub trait GraphStore: Send + Sync {
    /// Applies one transfer event. Self-transfers (`from == to`) update
    /// node counters only — no edge is created.
    fn record_transfer(
        &self,
        from: &Address,
        to: &Address,
        asset: &AssetContract,
        amount: Amount,
        height: Height,
        timestamp: u64,
    ) -> Result<(), IndexerError>;

    /// Attaches an additive network-specific label (e.g. "agent",
    /// "validator") to an address node, creating the node if it does not
    /// yet exist.
    fn add_label(&self, address: &Address, label: &str, height: Height, timestamp: u64) -> Result<(), IndexerError>;

    fn get_node(&self, address: &Address) -> Result<Option<AddressNode>, IndexerError>;
    fn get_edge(
        &self,
        from: &Address,
        to: &Address,
        asset: &AssetContract,
    ) -> Result<Option<TransferEdge>, IndexerError>;

    fn all_nodes(&self) -> Result<Vec<AddressNode>, IndexerError>;
    fn all_edges(&self) -> Result<Vec<TransferEdge>, IndexerError>;

    /// Writes `community_id` onto every listed node in one pass.
    fn apply_community_assignment(&self, assignment: &HashMap<Address, u64>) -> Result<(), IndexerError>;

    /// Writes `community_page_rank` onto every listed node.
    fn apply_page_ranks(&self, ranks: &HashMap<Address, f64>) -> Result<(), IndexerError>;

    /// Writes `network_embedding` onto every listed node.
    fn apply_embeddings(&self, embeddings: &HashMap<Address, Embedding>) -> Result<(), IndexerError>;
}
