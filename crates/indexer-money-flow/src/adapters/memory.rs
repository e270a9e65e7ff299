//! In-memory [`GraphStore`]: a direct translation of the per-block mutation
//! algorithm, held behind a single lock since the money-flow graph has
//! exactly one writer (this indexer).

use crate::ports::{AddressNode, Embedding, GraphStore, TransferEdge};
use indexer_types::{Address, Amount, AssetContract, Height, IndexerError};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

/// Per-node bookkeeping not part of the public [`AddressNode`] shape:
/// which counterparties have already been seen, so repeat edges (a second
/// transfer between the same pair) don't re-increment the "first creation
/// of an edge" counters.
#[derive(Default)]
struct Relations {
    neighbors: BTreeSet<Address>,
    senders: BTreeSet<Address>,
    receivers: BTreeSet<Address>,
}

#[derive(Default)]
struct GraphState {
    nodes: HashMap<Address, AddressNode>,
    edges: HashMap<(Address, Address, AssetContract), TransferEdge>,
    relations: HashMap<Address, Relations>,
}

fn touch_node(nodes: &mut HashMap<Address, AddressNode>, address: &Address, height: Height, timestamp: u64) {
    let node = nodes.entry(address.clone()).or_insert_with(|| AddressNode {
        address: address.clone(),
        first_activity_height: height,
        first_activity_timestamp: timestamp,
        last_activity_height: height,
        last_activity_timestamp: timestamp,
        neighbor_count: 0,
        unique_senders: 0,
        unique_receivers: 0,
        transfer_count: 0,
        community_id: None,
        community_page_rank: None,
        network_embedding: None,
        labels: BTreeSet::new(),
    });
    node.last_activity_height = height;
    node.last_activity_timestamp = timestamp;
}

#[derive(Default)]
pub struct InMemoryGraphStore {
    state: Mutex<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        InMemoryGraphStore::default()
    }
}

impl GraphStore for InMemoryGraphStore {
    fn record_transfer(
        &self,
        from: &Address,
        to: &Address,
        asset: &AssetContract,
        amount: Amount,
        height: Height,
        timestamp: u64,
    ) -> Result<(), IndexerError> {
        let mut state = self.state.lock();

        touch_node(&mut state.nodes, from, height, timestamp);
        state.nodes.get_mut(from).unwrap().transfer_count += 1;

        if from != to {
            touch_node(&mut state.nodes, to, height, timestamp);
            state.nodes.get_mut(to).unwrap().transfer_count += 1;
        }

        // Self-transfers update node counters only; no edge is created.
        if from == to {
            return Ok(());
        }

        let edge_key = (from.clone(), to.clone(), asset.clone());
        let is_new_edge = !state.edges.contains_key(&edge_key);
        let edge = state.edges.entry(edge_key).or_insert_with(|| TransferEdge {
            from: from.clone(),
            to: to.clone(),
            asset: asset.clone(),
            volume: Amount::ZERO,
            transfer_count: 0,
            first_activity_height: height,
            first_activity_timestamp: timestamp,
            last_activity_height: height,
            last_activity_timestamp: timestamp,
        });
        edge.volume = edge.volume + amount;
        edge.transfer_count += 1;
        edge.last_activity_height = height;
        edge.last_activity_timestamp = timestamp;

        if is_new_edge {
            let from_rel = state.relations.entry(from.clone()).or_default();
            let newly_receiver = from_rel.receivers.insert(to.clone());
            let from_newly_neighbor = from_rel.neighbors.insert(to.clone());

            let to_rel = state.relations.entry(to.clone()).or_default();
            let newly_sender = to_rel.senders.insert(from.clone());
            let to_newly_neighbor = to_rel.neighbors.insert(from.clone());

            if newly_receiver {
                state.nodes.get_mut(from).unwrap().unique_receivers += 1;
            }
            if newly_sender {
                state.nodes.get_mut(to).unwrap().unique_senders += 1;
            }
            if from_newly_neighbor {
                state.nodes.get_mut(from).unwrap().neighbor_count += 1;
            }
            if to_newly_neighbor {
                state.nodes.get_mut(to).unwrap().neighbor_count += 1;
            }
        }

        Ok(())
    }

    fn add_label(&self, address: &Address, label: &str, height: Height, timestamp: u64) -> Result<(), IndexerError> {
        let mut state = self.state.lock();
        touch_node(&mut state.nodes, address, height, timestamp);
        state.nodes.get_mut(address).unwrap().labels.insert(label.to_string());
        Ok(())
    }

    fn get_node(&self, address: &Address) -> Result<Option<AddressNode>, IndexerError> {
        Ok(self.state.lock().nodes.get(address).cloned())
    }

    fn get_edge(
        &self,
        from: &Address,
        to: &Address,
        asset: &AssetContract,
    ) -> Result<Option<TransferEdge>, IndexerError> {
        Ok(self
            .state
            .lock()
            .edges
            .get(&(from.clone(), to.clone(), asset.clone()))
            .cloned())
    }

    fn all_nodes(&self) -> Result<Vec<AddressNode>, IndexerError> {
        Ok(self.state.lock().nodes.values().cloned().collect())
    }

    fn all_edges(&self) -> Result<Vec<TransferEdge>, IndexerError> {
        Ok(self.state.lock().edges.values().cloned().collect())
    }

    fn apply_community_assignment(&self, assignment: &HashMap<Address, u64>) -> Result<(), IndexerError> {
        let mut state = self.state.lock();
        for (address, community_id) in assignment {
            if let Some(node) = state.nodes.get_mut(address) {
                node.community_id = Some(*community_id);
            }
        }
        Ok(())
    }

    fn apply_page_ranks(&self, ranks: &HashMap<Address, f64>) -> Result<(), IndexerError> {
        let mut state = self.state.lock();
        for (address, rank) in ranks {
            if let Some(node) = state.nodes.get_mut(address) {
                node.community_page_rank = Some(*rank);
            }
        }
        Ok(())
    }

    fn apply_embeddings(&self, embeddings: &HashMap<Address, Embedding>) -> Result<(), IndexerError> {
        let mut state = self.state.lock();
        for (address, embedding) in embeddings {
            if let Some(node) = state.nodes.get_mut(address) {
                node.network_embedding = Some(*embedding);
            }
        }
        Ok(())
    }
}
