//! Scenario: balance series periods — L=4h, blocks at
//! 0h/1h/5h/9h for address A on native asset with balances 100/100/150/150,
//! producing three period records (0h, 4h, 8h) with totals 100/150/150 and
//! deltas 100/+50/0 (percent changes 0/50/0).

use indexer_assets::{AssetDictionary, InMemoryAssetDictionary};
use indexer_balance_series::{BalanceSeriesIndexer, InMemoryBalanceSeriesStore, DEFAULT_PERIOD_MS};
use indexer_chain_client::adapters::mock::MockChainClient;
use indexer_chain_client::NetworkProfile;
use indexer_types::{Address, Amount, AssetContract, BalanceSnapshot, Block, NetworkId};
use std::collections::BTreeSet;
use std::sync::Arc;

fn block(height: u32, timestamp: u64, addr: &str) -> Block {
    Block {
        height,
        hash: format!("0x{height:x}"),
        timestamp,
        extrinsics: vec![],
        events: vec![],
        addresses: BTreeSet::from([Address(addr.to_string())]),
    }
}

fn hour(n: u64) -> u64 {
    n * 60 * 60 * 1_000
}

#[tokio::test]
async fn three_periods_with_expected_totals_deltas_and_asset_registration() {
    let chain = Arc::new(MockChainClient::new(vec![]));
    let assets = Arc::new(InMemoryAssetDictionary::new());
    let store = Arc::new(InMemoryBalanceSeriesStore::new());
    let network = NetworkId::Torus;
    let profile = NetworkProfile::for_network(network);
    let native = AssetContract::native();
    let addr = Address("A".to_string());

    let indexer = BalanceSeriesIndexer::new(
        network,
        profile,
        DEFAULT_PERIOD_MS,
        vec![native.clone()],
        Arc::clone(&chain),
        Arc::clone(&assets),
        Arc::clone(&store),
    );

    let readings = [(0u32, hour(0), 100i128), (1, hour(1), 100), (2, hour(5), 150), (3, hour(9), 150)];
    for (h, _ts, bal) in readings {
        chain.set_balance(h, addr.clone(), native.clone(), BalanceSnapshot::new(Amount(bal), Amount::ZERO, Amount::ZERO));
    }

    let mut blocks: Vec<Block> = readings.iter().map(|(h, ts, _)| block(*h, *ts, "A")).collect();
    // A block far past the last period forces the trailing 8h window closed.
    blocks.push(block(4, hour(100), "A"));

    indexer.process_batch(&blocks).await.unwrap();

    let records = store.all_for(&addr, &native);
    assert_eq!(records.len(), 3);

    let expected = [
        (0u64, 100i128, 100i128, 0.0f64),
        (hour(4), 150, 50, 50.0),
        (hour(8), 150, 0, 0.0),
    ];
    for (record, (period_start, total, delta_total, pct)) in records.iter().zip(expected) {
        assert_eq!(record.period_start, period_start);
        assert_eq!(record.total, Amount(total));
        assert_eq!(record.delta_total, Amount(delta_total));
        assert_eq!(record.percent_change_total, pct);
        assert!(record.free.is_non_negative() && record.reserved.is_non_negative() && record.staked.is_non_negative());
        assert_eq!(record.total, record.free + record.reserved + record.staked);
    }

    // §4.7 step 5: every touched asset is registered in the dictionary.
    assert!(assets.lookup(network, &native).unwrap().is_some());
}
