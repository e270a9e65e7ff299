//! Scenario: cold start to a fresh chain — blocks 0-99 where
//! only blocks 10 and 20 each carry a single native transfer X -> Y of 100,
//! fee 1.

use crate::fixtures::{empty_block, transfer_block};
use indexer_assets::{AssetDictionary, InMemoryAssetDictionary, VerificationStatus};
use indexer_chain_client::NetworkProfile;
use indexer_money_flow::{InMemoryGraphStore, MoneyFlowIndexer};
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use indexer_types::{Address, AssetContract, NetworkId};
use std::sync::Arc;

fn blocks() -> Vec<indexer_types::Block> {
    (0u32..100)
        .map(|h| match h {
            10 => transfer_block(10, 10_000, "X", "Y", 100, 1),
            20 => transfer_block(20, 20_000, "X", "Y", 100, 1),
            other => empty_block(other, other as u64 * 1_000),
        })
        .collect()
}

#[test]
fn transfer_rows_asset_dictionary_and_money_flow_graph_match_spec() {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);

    let assets = Arc::new(InMemoryAssetDictionary::new());
    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let transfers = TransfersIndexer::new(network, profile, Arc::clone(&assets), Arc::clone(&transfer_store));

    let graph_store = Arc::new(InMemoryGraphStore::new());
    let money_flow = MoneyFlowIndexer::new(profile, Arc::clone(&graph_store), 1_000);

    let blocks = blocks();
    transfers.process_batch(&blocks).unwrap();
    money_flow.process_batch(&blocks).unwrap();

    assert_eq!(transfer_store.len(), 2, "exactly one row per transfer-bearing block");

    let native = AssetContract::native();
    let x = Address("X".to_string());
    let y = Address("Y".to_string());

    let edge = graph_store.get_edge(&x, &y, &native).unwrap().unwrap();
    assert_eq!(edge.volume.0, 200);
    assert_eq!(edge.transfer_count, 2);

    let x_node = graph_store.get_node(&x).unwrap().unwrap();
    assert_eq!(x_node.transfer_count, 2);
    assert_eq!(x_node.unique_receivers, 1);
    assert_eq!(x_node.neighbor_count, 1);

    let y_node = graph_store.get_node(&y).unwrap().unwrap();
    assert_eq!(y_node.transfer_count, 2);
    assert_eq!(y_node.unique_senders, 1);
    assert_eq!(y_node.neighbor_count, 1);

    let asset_record = assets.lookup(network, &native).unwrap().unwrap();
    assert_eq!(asset_record.status, VerificationStatus::Verified);
}
