//! Scenario: resume after crash — run the cold-start scenario to
//! checkpoint 15, "kill" the process, restart. Final state must be
//! byte-identical to an uninterrupted run (exactly-once projection given
//! idempotent stores).

use crate::fixtures::{drive_to_checkpoint, empty_block, transfer_block};
use indexer_assets::InMemoryAssetDictionary;
use indexer_chain_client::NetworkProfile;
use indexer_checkpoint::{CheckpointStore, InMemoryCheckpointStore};
use indexer_money_flow::{InMemoryGraphStore, MoneyFlowIndexer};
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use indexer_types::{Block, NetworkId};
use std::sync::Arc;

const CONSUMER: &str = "transfers";

fn blocks() -> Vec<Block> {
    (0u32..100)
        .map(|h| match h {
            10 => transfer_block(10, 10_000, "X", "Y", 100, 1),
            20 => transfer_block(20, 20_000, "X", "Y", 100, 1),
            other => empty_block(other, other as u64 * 1_000),
        })
        .collect()
}

fn run_to_completion(checkpoints: &dyn CheckpointStore, interrupt_at: Option<u32>) -> Vec<indexer_transfers::TransferRecord> {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    // The destination store is durable storage: it survives the simulated
    // crash below. Only the in-process `TransfersIndexer`/runtime state is
    // discarded and rebuilt from the checkpoint, as a real restart would.
    let store = Arc::new(InMemoryTransferStore::new());
    let blocks = blocks();

    if let Some(stop_at) = interrupt_at {
        let indexer = TransfersIndexer::new(network, profile, Arc::clone(&assets), Arc::clone(&store));
        drive_to_checkpoint(&blocks, checkpoints, CONSUMER, 7, stop_at, |batch| {
            indexer.process_batch(batch)
        });
        assert!(checkpoints.get(CONSUMER).unwrap() >= stop_at);
    }

    // "Restart": a freshly constructed indexer, wired to the same durable
    // checkpoint and destination store, driven the rest of the way to tip.
    let resumed = TransfersIndexer::new(network, profile, assets, Arc::clone(&store));
    drive_to_checkpoint(&blocks, checkpoints, CONSUMER, 7, 99, |batch| resumed.process_batch(batch));

    let mut rows = store.all();
    rows.sort_by(|a, b| (a.extrinsic_id.clone(), a.event_idx).cmp(&(b.extrinsic_id.clone(), b.event_idx)));
    rows
}

#[test]
fn interrupted_and_uninterrupted_runs_converge_on_identical_state() {
    let uninterrupted_checkpoints = InMemoryCheckpointStore::default();
    let uninterrupted = run_to_completion(&uninterrupted_checkpoints, None);

    let interrupted_checkpoints = InMemoryCheckpointStore::default();
    let interrupted = run_to_completion(&interrupted_checkpoints, Some(15));

    assert_eq!(uninterrupted, interrupted);
    assert_eq!(uninterrupted.len(), 2);
    assert_eq!(
        uninterrupted_checkpoints.get(CONSUMER).unwrap(),
        interrupted_checkpoints.get(CONSUMER).unwrap()
    );
}

#[test]
fn checkpoint_never_moves_backward_across_a_restart() {
    let checkpoints = InMemoryCheckpointStore::default();
    let _ = run_to_completion(&checkpoints, Some(15));
    let after_first_phase = checkpoints.get(CONSUMER).unwrap();
    assert!(after_first_phase >= 15);
    // A second restart driving to the same tip must not regress.
    let blocks = blocks();
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let store = Arc::new(InMemoryTransferStore::new());
    let indexer = TransfersIndexer::new(network, profile, assets, store);
    drive_to_checkpoint(&blocks, &checkpoints, CONSUMER, 7, 99, |batch| indexer.process_batch(batch));
    assert!(checkpoints.get(CONSUMER).unwrap() >= after_first_phase);

    // money-flow's independent checkpoint progressing has no bearing on
    // transfers' — consumers are decoupled.
    let _ = MoneyFlowIndexer::new(NetworkProfile::for_network(network), Arc::new(InMemoryGraphStore::new()), 1_000);
}
