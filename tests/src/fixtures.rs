//! Shared block-building helpers for the scenario suite.

use indexer_checkpoint::CheckpointStore;
use indexer_types::{Address, Block, Event, Extrinsic, ExtrinsicStatus, Height, IndexerError};
use std::collections::BTreeSet;

/// An otherwise-empty block at `height`/`timestamp` with no extrinsics or
/// events — used to advance the chain between blocks of interest.
pub fn empty_block(height: u32, timestamp: u64) -> Block {
    Block {
        height,
        hash: format!("0x{height:x}"),
        timestamp,
        extrinsics: vec![],
        events: vec![],
        addresses: BTreeSet::new(),
    }
}

/// A block containing a single `Balances.Transfer(from -> to, amount, fee)`
/// native-asset event, with `addresses` derived per the block-record
/// invariant (the addresses set is exactly the union of addresses named
/// in any extrinsic or event).
pub fn transfer_block(height: u32, timestamp: u64, from: &str, to: &str, amount: u128, fee: u128) -> Block {
    let extrinsic_id = format!("{height}-0");
    Block {
        height,
        hash: format!("0x{height:x}"),
        timestamp,
        extrinsics: vec![Extrinsic {
            id: extrinsic_id.clone(),
            hash: format!("0xext{height}"),
            signer: Some(Address(from.to_string())),
            module: "Balances".to_string(),
            function: "transfer".to_string(),
            status: ExtrinsicStatus::Success,
        }],
        events: vec![Event {
            id: extrinsic_id.clone(),
            extrinsic_id,
            module_id: "Balances".to_string(),
            event_id: "Transfer".to_string(),
            attributes: serde_json::json!({
                "from": from,
                "to": to,
                "amount": amount.to_string(),
                "fee": fee.to_string(),
            }),
        }],
        addresses: BTreeSet::new(),
    }
    .with_derived_addresses()
}

/// Drives the shared Consumer Runtime contract synchronously
/// and deterministically: read checkpoint, fetch a contiguous batch of at
/// most `batch_size` blocks past it, hand the batch to `process`, commit
/// the checkpoint only once `process` returns `Ok`. Stops once the
/// checkpoint reaches `stop_at` (inclusive) or there are no more blocks.
///
/// This is the same contract `indexer_runtime::Runtime::run` implements,
/// minus the idle-poll sleep and retry/backoff — tests need a deterministic
/// stopping point, not wall-clock suspension.
pub fn drive_to_checkpoint(
    blocks: &[Block],
    checkpoints: &dyn CheckpointStore,
    consumer: &str,
    batch_size: u32,
    stop_at: Height,
    mut process: impl FnMut(&[Block]) -> Result<usize, IndexerError>,
) {
    let max_height = blocks.iter().map(|b| b.height).max().unwrap_or(0);
    loop {
        let height = checkpoints.get(consumer).unwrap();
        if height >= stop_at || height >= max_height {
            return;
        }
        let end = height.saturating_add(batch_size).min(max_height);
        let batch: Vec<Block> = blocks
            .iter()
            .filter(|b| b.height > height && b.height <= end)
            .cloned()
            .collect();
        if batch.is_empty() {
            return;
        }
        let last_height = batch.last().map(|b| b.height).unwrap();
        process(&batch).expect("batch processing must succeed in this fixture");
        checkpoints.set(consumer, last_height).unwrap();
    }
}
