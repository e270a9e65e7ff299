//! Universal invariants (checkpoint monotonicity, block-stream contiguity,
//! transfer/edge volume conservation, asset existence, and edge keying)
//! checked against a larger, mixed batch of blocks rather than one fixed
//! scenario.

use crate::fixtures::{empty_block, transfer_block};
use indexer_assets::{AssetDictionary, InMemoryAssetDictionary};
use indexer_chain_client::NetworkProfile;
use indexer_checkpoint::{CheckpointStore, InMemoryCheckpointStore};
use indexer_money_flow::{InMemoryGraphStore, MoneyFlowIndexer};
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use indexer_types::{AssetContract, Block, NetworkId};
use std::sync::Arc;

fn mixed_blocks() -> Vec<Block> {
    let pairs = [("X", "Y"), ("Y", "Z"), ("X", "Z"), ("X", "Y"), ("Z", "X")];
    (0u32..50)
        .map(|h| {
            if h % 7 == 0 && (h as usize / 7) < pairs.len() {
                let (from, to) = pairs[h as usize / 7];
                transfer_block(h, h as u64 * 1_000, from, to, 10 + h as u128, 1)
            } else {
                empty_block(h, h as u64 * 1_000)
            }
        })
        .collect()
}

#[test]
fn block_stream_heights_are_contiguous_from_zero() {
    let blocks = mixed_blocks();
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.height, i as u32, "invariant 3: contiguity, no gaps");
    }
}

#[test]
fn transfer_volume_matches_aggregated_edge_volume_per_asset() {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let transfers = TransfersIndexer::new(network, profile, assets, Arc::clone(&transfer_store));

    let graph_store = Arc::new(InMemoryGraphStore::new());
    let money_flow = MoneyFlowIndexer::new(profile, Arc::clone(&graph_store), 1_000_000);

    let blocks = mixed_blocks();
    transfers.process_batch(&blocks).unwrap();
    money_flow.process_batch(&blocks).unwrap();

    let native = AssetContract::native();
    let row_total: i128 = transfer_store
        .all()
        .into_iter()
        .filter(|r| r.asset_contract == native)
        .map(|r| r.amount.0)
        .sum();

    let edge_total: i128 = graph_store
        .all_edges()
        .unwrap()
        .into_iter()
        .filter(|e| e.asset == native)
        .map(|e| e.volume.0)
        .sum();

    assert_eq!(row_total, edge_total, "invariant 4: transfer aggregation");

    // invariant 8: no two edges share (from, to, asset).
    let edges = graph_store.all_edges().unwrap();
    let mut keys: Vec<_> = edges.iter().map(|e| (e.from.clone(), e.to.clone(), e.asset.clone())).collect();
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), before, "invariant 8: edge keying");
}

#[test]
fn every_transfer_rows_asset_exists_in_the_dictionary() {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let transfers = TransfersIndexer::new(network, profile, Arc::clone(&assets), Arc::clone(&transfer_store));

    transfers.process_batch(&mixed_blocks()).unwrap();

    for row in transfer_store.all() {
        assert!(
            assets.lookup(network, &row.asset_contract).unwrap().is_some(),
            "invariant 7: asset existence for {:?}",
            row.asset_contract
        );
    }
}

#[test]
fn checkpoint_is_monotonically_non_decreasing_across_batches() {
    let checkpoints = InMemoryCheckpointStore::default();
    let blocks = mixed_blocks();
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let store = Arc::new(InMemoryTransferStore::new());
    let indexer = TransfersIndexer::new(network, profile, assets, store);

    let mut previous = 0u32;
    let batch_size = 5;
    loop {
        let height = checkpoints.get("transfers").unwrap();
        assert!(height >= previous, "invariant 1: checkpoint monotonicity");
        previous = height;
        let max_height = blocks.last().unwrap().height;
        if height >= max_height {
            break;
        }
        let end = (height + batch_size).min(max_height);
        let batch: Vec<Block> = blocks.iter().filter(|b| b.height > height && b.height <= end).cloned().collect();
        indexer.process_batch(&batch).unwrap();
        checkpoints.set("transfers", end).unwrap();
    }
}
