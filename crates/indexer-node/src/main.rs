//! Wires the Block Stream Ingester and the three downstream Consumer
//! Runtime loops (Balance Transfers, Balance Series, Money Flow) together
//! for a single configured network, then runs them concurrently until
//! Ctrl+C.

mod schema;

use indexer_assets::InMemoryAssetDictionary;
use indexer_balance_series::{BalanceSeriesIndexer, InMemoryBalanceSeriesStore};
use indexer_block_stream::{BlockStreamStore, KeyValueStore};
use indexer_chain_client::adapters::subxt_client::{SubxtChainClient, SubxtClientConfig};
use indexer_chain_client::NetworkProfile;
use indexer_checkpoint::KvCheckpointStore;
use indexer_config::{AppConfig, MilestoneDefaults};
use indexer_ingest::{IngestConfig, Ingester};
use indexer_money_flow::{InMemoryGraphStore, MoneyFlowIndexer};
use indexer_partition::Partitioner;
use indexer_runtime::{Runtime, RuntimeConfig, Shutdown};
use indexer_transfers::{InMemoryTransferStore, TransfersIndexer};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = AppConfig::load(&config_path)?;

    indexer_telemetry::init("indexer-node")?;
    indexer_telemetry::log_lifecycle_event("indexer-node", "starting", &config.summary());

    #[cfg(feature = "rocksdb-backend")]
    let kv_store = Arc::new(indexer_block_stream::adapters::rocksdb::RocksDbStore::open(
        indexer_block_stream::adapters::rocksdb::RocksDbConfig {
            path: config.block_stream_dsn.clone(),
            ..Default::default()
        },
    )?);
    #[cfg(not(feature = "rocksdb-backend"))]
    let kv_store = Arc::new(indexer_block_stream::adapters::memory::InMemoryStore::default());

    let result = run(kv_store, config).await;
    indexer_telemetry::log_lifecycle_event("indexer-node", "stopped", "shutdown complete");
    result
}

async fn run<S: KeyValueStore + 'static>(kv_store: Arc<S>, config: AppConfig) -> anyhow::Result<()> {
    let network = config.network_id();
    let profile = NetworkProfile::for_network(network);

    let block_stream = Arc::new(BlockStreamStore::new(
        Arc::clone(&kv_store),
        Partitioner::new(config.partition_size),
    )?);
    let checkpoints = Arc::new(KvCheckpointStore::new(Arc::clone(&kv_store)));

    indexer_schema::apply_all(&[
        &schema::block_stream_target(),
        &schema::columnar_target(),
        &schema::graph_target(),
    ])?;

    let chain = Arc::new(
        SubxtChainClient::connect(
            SubxtClientConfig {
                url: config.chain_node_url.clone(),
                request_timeout: Duration::from_secs(30),
            },
            profile,
        )
        .await?,
    );

    let assets = Arc::new(InMemoryAssetDictionary::new());
    assets.seed_native(network, network.native_symbol(), profile.native_decimals, 0);

    let transfer_store = Arc::new(InMemoryTransferStore::new());
    let balance_series_store = Arc::new(InMemoryBalanceSeriesStore::new());
    let graph_store = Arc::new(InMemoryGraphStore::new());

    let transfers_indexer = Arc::new(TransfersIndexer::new(network, profile, Arc::clone(&assets), transfer_store));
    let balance_series_indexer = Arc::new(BalanceSeriesIndexer::new(
        network,
        profile,
        u64::from(config.period_hours) * 60 * 60 * 1_000,
        vec![indexer_types::AssetContract::native()],
        Arc::clone(&chain),
        Arc::clone(&assets),
        balance_series_store,
    ));
    let money_flow_indexer = Arc::new(MoneyFlowIndexer::new(profile, graph_store, config.analytics_cadence_blocks));

    let shutdown = Shutdown::new();

    let ingester = Ingester::new(
        network.to_string(),
        Arc::clone(&chain),
        Arc::clone(&block_stream),
        IngestConfig::new(config.batch_size, MilestoneDefaults::BLOCK_STREAM),
    );

    let transfers_runtime = Runtime::new(
        network.to_string(),
        Arc::clone(&block_stream),
        Arc::clone(&checkpoints),
        transfers_indexer,
        RuntimeConfig::new(config.batch_size, config.milestone_interval_for(MilestoneDefaults::TRANSFERS)),
    );
    let balance_series_runtime = Runtime::new(
        network.to_string(),
        Arc::clone(&block_stream),
        Arc::clone(&checkpoints),
        balance_series_indexer,
        RuntimeConfig::new(config.batch_size, config.milestone_interval_for(MilestoneDefaults::BALANCE_SERIES)),
    );
    let money_flow_runtime = Runtime::new(
        network.to_string(),
        Arc::clone(&block_stream),
        Arc::clone(&checkpoints),
        money_flow_indexer,
        RuntimeConfig::new(config.batch_size, config.milestone_interval_for(MilestoneDefaults::MONEY_FLOW)),
    );

    let ingest_shutdown = shutdown.clone();
    let transfers_shutdown = shutdown.clone();
    let balance_series_shutdown = shutdown.clone();
    let money_flow_shutdown = shutdown.clone();

    let ingest_task = tokio::spawn(async move { ingester.run(ingest_shutdown).await });
    let transfers_task = tokio::spawn(async move { transfers_runtime.run(transfers_shutdown).await });
    let balance_series_task = tokio::spawn(async move { balance_series_runtime.run(balance_series_shutdown).await });
    let money_flow_task = tokio::spawn(async move { money_flow_runtime.run(money_flow_shutdown).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping consumers");
    shutdown.trigger();

    let (ingest_result, transfers_result, balance_series_result, money_flow_result) =
        tokio::join!(ingest_task, transfers_task, balance_series_task, money_flow_task);

    ingest_result??;
    transfers_result??;
    balance_series_result??;
    money_flow_result??;

    Ok(())
}
