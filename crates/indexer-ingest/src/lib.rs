//! The Block Stream Ingester: the sole writer of the canonical event log.
//! Polls a [`ChainClient`] for its finalized head, fetches contiguous
//! blocks past the store's current `max_height`, and appends them.
//! Downstream consumers never call the chain client directly — they only
//! ever read from the block stream this produces.

use indexer_block_stream::{BlockStreamStore, KeyValueStore};
use indexer_chain_client::ChainClient;
use indexer_runtime::{BackoffPolicy, Shutdown};
use indexer_telemetry::Milestones;
use indexer_types::{ErrorClass, Height, IndexerError};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Blocks requested per `fetch_blocks` call.
    pub batch_size: u32,
    pub milestone_interval: u32,
    pub catching_up_threshold: u32,
    /// How long to sleep when the chain has produced nothing new.
    pub idle_poll_interval: Duration,
    pub backoff: BackoffPolicy,
}

impl IngestConfig {
    pub fn new(batch_size: u32, milestone_interval: u32) -> Self {
        IngestConfig {
            batch_size: batch_size.max(1),
            milestone_interval: milestone_interval.max(1),
            catching_up_threshold: 1_000,
            idle_poll_interval: Duration::from_secs(2),
            backoff: BackoffPolicy::default(),
        }
    }
}

pub struct Ingester<C: ChainClient, S: KeyValueStore> {
    network: String,
    chain: Arc<C>,
    store: Arc<BlockStreamStore<S>>,
    config: IngestConfig,
}

impl<C: ChainClient, S: KeyValueStore> Ingester<C, S> {
    pub fn new(network: impl Into<String>, chain: Arc<C>, store: Arc<BlockStreamStore<S>>, config: IngestConfig) -> Self {
        Ingester {
            network: network.into(),
            chain,
            store,
            config,
        }
    }

    /// Runs until `shutdown` is triggered or a fatal chain error propagates.
    /// `MaxHeight` on the block stream doubles as this component's own
    /// resume point — there is no separate ingester checkpoint record.
    pub async fn run(&self, shutdown: Shutdown) -> Result<(), IndexerError> {
        let mut milestones = Milestones::new("ingester", self.network.clone(), self.config.milestone_interval);
        let mut height = self.store.max_height()?;
        milestones.log_startup_decision(height);
        let mut retry_delay = self.config.backoff.initial;

        loop {
            if shutdown.is_triggered() {
                return Ok(());
            }

            let tip = match self.chain.finalized_head().await {
                Ok(tip) => tip,
                Err(e) => {
                    retry_delay = self.retry_or_halt(e, &mut milestones, retry_delay).await?;
                    continue;
                }
            };
            milestones.maybe_log_catching_up(height, tip, self.config.catching_up_threshold);

            if height >= tip {
                tokio::time::sleep(self.config.idle_poll_interval).await;
                continue;
            }

            milestones.start_batch();
            let batch = match self.chain.fetch_blocks(height + 1, self.config.batch_size).await {
                Ok(batch) => batch,
                Err(e) => {
                    retry_delay = self.retry_or_halt(e, &mut milestones, retry_delay).await?;
                    continue;
                }
            };
            retry_delay = self.config.backoff.initial;

            if batch.is_empty() {
                tokio::time::sleep(self.config.idle_poll_interval).await;
                continue;
            }

            self.store.append(&batch)?;
            let last_height = batch.last().map(|b| b.height).unwrap_or(height);
            milestones.record_batch(height + 1, last_height, batch.len() as u64);
            height = last_height;
        }
    }

    /// Sleeps under backoff for a retryable chain error and returns the next
    /// delay to use; propagates fatal errors (e.g. malformed chain data) to
    /// halt the process so an operator can investigate, per §4.1's failure
    /// semantics.
    async fn retry_or_halt(
        &self,
        error: IndexerError,
        milestones: &mut Milestones,
        delay: Duration,
    ) -> Result<Duration, IndexerError> {
        milestones.record_error(error_kind_label(&error));

        if error.classify() != ErrorClass::Retryable {
            tracing::error!(network = %self.network, error = %error, "fatal chain error; halting ingestion");
            return Err(error);
        }

        tracing::warn!(network = %self.network, error = %error, delay_ms = delay.as_millis() as u64, "retrying after a transient chain error");
        tokio::time::sleep(delay).await;
        Ok(self.config.backoff.next(delay))
    }
}

fn error_kind_label(error: &IndexerError) -> &'static str {
    match error {
        IndexerError::ChainUnavailable(_) => "chain_unavailable",
        IndexerError::ChainMalformed { .. } => "chain_malformed",
        IndexerError::StorageTransient(_) => "storage_transient",
        IndexerError::StorageFatal(_) => "storage_fatal",
        IndexerError::SchemaError(_) => "schema_error",
        IndexerError::InvariantViolation(_) => "invariant_violation",
        IndexerError::ConfigError(_) => "config_error",
    }
}
