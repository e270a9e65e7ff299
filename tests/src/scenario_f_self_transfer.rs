//! Scenario: self-transfer — `Balances.Transfer(X -> X, 50)`
//! creates a transfer row but no money-flow edge; X's `transfer_count`
//! still increases by 1 (edges suppressed, node counters still update).

use crate::fixtures::transfer_block;
use indexer_assets::InMemoryAssetDictionary;
use indexer_chain_client::NetworkProfile;
use indexer_money_flow::{InMemoryGraphStore, MoneyFlowIndexer};
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use indexer_types::{Address, AssetContract, NetworkId};
use std::sync::Arc;

#[test]
fn self_transfer_writes_a_row_but_no_edge() {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);

    let assets = Arc::new(InMemoryAssetDictionary::new());
    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let transfers = TransfersIndexer::new(network, profile, assets, Arc::clone(&transfer_store));

    let graph_store = Arc::new(InMemoryGraphStore::new());
    let money_flow = MoneyFlowIndexer::new(profile, Arc::clone(&graph_store), 1_000);

    let blocks = vec![transfer_block(1, 1_000, "X", "X", 50, 1)];
    transfers.process_batch(&blocks).unwrap();
    money_flow.process_batch(&blocks).unwrap();

    assert_eq!(transfer_store.len(), 1, "the transfer row is still written");

    let x = Address("X".to_string());
    let native = AssetContract::native();
    assert!(
        graph_store.get_edge(&x, &x, &native).unwrap().is_none(),
        "self-transfers must not create a money-flow edge"
    );

    let node = graph_store.get_node(&x).unwrap().unwrap();
    assert_eq!(node.transfer_count, 1, "node counters still update on a self-transfer");
    assert_eq!(node.neighbor_count, 0, "no counterparty means no neighbor");
    assert_eq!(node.unique_senders, 0);
    assert_eq!(node.unique_receivers, 0);
}
