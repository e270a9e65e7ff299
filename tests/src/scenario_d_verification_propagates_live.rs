//! Scenario: malicious asset flag propagates live — a token
//! transfer is indexed while its contract is `unknown`; an operator then
//! upserts it to `malicious`, with no reindex required to observe the new
//! status (verification lives in one small table, joined at read time).

use indexer_assets::{AssetDictionary, InMemoryAssetDictionary, VerificationStatus};
use indexer_chain_client::NetworkProfile;
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use indexer_types::{AssetContract, Block, Event, Extrinsic, ExtrinsicStatus, NetworkId};
use std::collections::BTreeSet;
use std::sync::Arc;

fn token_transfer_block(height: u32) -> Block {
    let extrinsic_id = format!("{height}-0");
    Block {
        height,
        hash: format!("0x{height:x}"),
        timestamp: height as u64 * 1_000,
        extrinsics: vec![Extrinsic {
            id: extrinsic_id.clone(),
            hash: format!("0xext{height}"),
            signer: Some(indexer_types::Address("X".to_string())),
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
                "from": "X",
                "to": "Y",
                "amount": "1000",
                "asset_contract": "0xabc",
                "asset_symbol": "SCAM",
            }),
        }],
        addresses: BTreeSet::new(),
    }
    .with_derived_addresses()
}

#[test]
fn upserting_verification_status_requires_no_reindex() {
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let indexer = TransfersIndexer::new(network, profile, Arc::clone(&assets), Arc::clone(&transfer_store));

    let contract = AssetContract("0xabc".to_string());
    indexer.process_batch(&[token_transfer_block(1)]).unwrap();

    let transfer_row = transfer_store.get("1-0", 0, &contract).expect("row written even though asset is unverified");
    assert_eq!(transfer_row.asset_contract, contract);

    let record = assets.lookup(network, &contract).unwrap().unwrap();
    assert_eq!(record.status, VerificationStatus::Unknown);

    assets
        .update_verification(network, &contract, VerificationStatus::Malicious, "operator", Some("reported scam".into()), 2_000)
        .unwrap();

    // The external API's join path (out of scope here) would read this
    // same lookup; no reindex of the already-written transfer row occurred.
    let updated = assets.lookup(network, &contract).unwrap().unwrap();
    assert_eq!(updated.status, VerificationStatus::Malicious);
    let unchanged_row = transfer_store.get("1-0", 0, &contract).unwrap();
    assert_eq!(unchanged_row, transfer_row);

    // Subsequent reindexing of the same block is idempotent (replay-safe)
    // and does not revert the verification status the operator just set.
    indexer.process_batch(&[token_transfer_block(1)]).unwrap();
    assert_eq!(assets.lookup(network, &contract).unwrap().unwrap().status, VerificationStatus::Malicious);
}
