//! The Consumer Runtime: one generic loop, shared by every downstream
//! indexer (Transfers, Balance Series, Money Flow).
//!
//! The loop itself never touches indexer-specific logic — it reads a
//! checkpoint, compares it to the block stream's tip, fetches a batch,
//! hands it to an [`Indexer`], commits the checkpoint once the batch's
//! writes are durable, and emits progress milestones. Retry/backoff and
//! the consecutive-failure warning live here too, so every indexer gets
//! them for free rather than reimplementing them.

mod backoff;
mod shutdown;

pub use backoff::BackoffPolicy;
pub use shutdown::Shutdown;

use async_trait::async_trait;
use indexer_telemetry::Milestones;
use indexer_types::{Block, ErrorClass, Height, IndexerError};
use std::sync::Arc;
use std::time::Duration;

/// The unit of work a consumer runs: extract/transform/load one batch of
/// contiguous blocks, returning the number of downstream items written.
/// Implementations must not return `Ok` until every write the batch
/// produced is durable — that is the sole contract the runtime relies on
/// before advancing the checkpoint.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Short, stable name used for checkpoints, logs, and metrics labels.
    fn name(&self) -> &'static str;

    async fn process_batch(&self, blocks: &[Block]) -> Result<usize, IndexerError>;
}

/// Abstracts the block stream store so the runtime doesn't need to be
/// generic over the store's own backing [`indexer_block_stream::KeyValueStore`].
pub trait BlockSource: Send + Sync {
    fn max_height(&self) -> Result<Height, IndexerError>;
    fn range(&self, start: Height, end: Height) -> Result<Vec<Block>, IndexerError>;
}

impl<S: indexer_block_stream::KeyValueStore> BlockSource for indexer_block_stream::BlockStreamStore<S> {
    fn max_height(&self) -> Result<Height, IndexerError> {
        self.max_height()
    }

    fn range(&self, start: Height, end: Height) -> Result<Vec<Block>, IndexerError> {
        self.range(start, end)
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Blocks fetched per iteration; the consumer's configured `batch_size`.
    pub batch_size: u32,
    /// How often (in committed blocks) to log a progress milestone.
    pub milestone_interval: u32,
    /// Gap between checkpoint and tip above which "catching up" is logged
    /// once on startup.
    pub catching_up_threshold: u32,
    /// How long to sleep when the consumer is caught up to the tip.
    pub idle_poll_interval: Duration,
    pub backoff: BackoffPolicy,
}

impl RuntimeConfig {
    pub fn new(batch_size: u32, milestone_interval: u32) -> Self {
        RuntimeConfig {
            batch_size: batch_size.max(1),
            milestone_interval: milestone_interval.max(1),
            catching_up_threshold: 1_000,
            idle_poll_interval: Duration::from_secs(2),
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Generic read-checkpoint -> fetch -> process -> commit loop, reused by
/// every downstream indexer. Ordering within a single consumer is strictly
/// ascending by height; writes for the next batch never begin until the
/// current batch's checkpoint advance is durable.
pub struct Runtime<B: BlockSource, C: indexer_checkpoint::CheckpointStore, I: Indexer> {
    network: String,
    source: Arc<B>,
    checkpoints: Arc<C>,
    indexer: Arc<I>,
    config: RuntimeConfig,
}

impl<B: BlockSource, C: indexer_checkpoint::CheckpointStore, I: Indexer> Runtime<B, C, I> {
    pub fn new(network: impl Into<String>, source: Arc<B>, checkpoints: Arc<C>, indexer: Arc<I>, config: RuntimeConfig) -> Self {
        Runtime {
            network: network.into(),
            source,
            checkpoints,
            indexer,
            config,
        }
    }

    /// Runs the loop until `shutdown` is triggered or a fatal error
    /// propagates. On graceful shutdown, returns `Ok(())` with no partial
    /// commit ever having occurred: the in-flight batch either finished
    /// durably before the check, or was abandoned pre-commit.
    pub async fn run(&self, shutdown: Shutdown) -> Result<(), IndexerError> {
        let consumer = self.indexer.name();
        let mut milestones = Milestones::new(consumer, self.network.clone(), self.config.milestone_interval);

        let mut height = self.checkpoints.get(consumer)?;
        milestones.log_startup_decision(height);

        loop {
            if shutdown.is_triggered() {
                return Ok(());
            }

            let tip = self.source.max_height()?;
            milestones.maybe_log_catching_up(height, tip, self.config.catching_up_threshold);

            if height >= tip {
                tokio::time::sleep(self.config.idle_poll_interval).await;
                continue;
            }

            let end = height.saturating_add(self.config.batch_size).min(tip);
            let batch = self.source.range(height + 1, end)?;
            if batch.is_empty() {
                tokio::time::sleep(self.config.idle_poll_interval).await;
                continue;
            }

            milestones.start_batch();
            match self.process_with_retry(&batch, &shutdown, &mut milestones).await? {
                Some(items) => {
                    let last_height = batch.last().map(|b| b.height).unwrap_or(end);
                    self.checkpoints.set(consumer, last_height)?;
                    milestones.record_batch(height + 1, last_height, items as u64);
                    height = last_height;
                }
                None => return Ok(()), // shutdown observed mid-retry; batch left uncommitted.
            }
        }
    }

    /// Retries the batch under backoff while `shutdown` is not set.
    /// Returns `Ok(None)` if shutdown interrupted the retry loop (the
    /// batch remains uncommitted and will be refetched from the same
    /// checkpoint on the next run). Returns `Err` for fatal errors, which
    /// propagate to the caller and halt the process.
    async fn process_with_retry(
        &self,
        batch: &[Block],
        shutdown: &Shutdown,
        milestones: &mut Milestones,
    ) -> Result<Option<usize>, IndexerError> {
        let consumer = self.indexer.name();
        let mut attempt: u32 = 0;
        let mut delay = self.config.backoff.initial;

        loop {
            if shutdown.is_triggered() {
                return Ok(None);
            }

            match self.indexer.process_batch(batch).await {
                Ok(items) => return Ok(Some(items)),
                Err(e) if e.classify() == ErrorClass::Retryable => {
                    attempt += 1;
                    milestones.record_error(error_kind_label(&e));

                    if attempt == 3 {
                        tracing::warn!(
                            consumer,
                            network = %self.network,
                            attempt,
                            "three consecutive retries of the same batch: the pipeline may be stuck"
                        );
                    }

                    let start_height = batch.first().map(|b| b.height).unwrap_or(0);
                    let end_height = batch.last().map(|b| b.height).unwrap_or(0);
                    tracing::warn!(
                        consumer,
                        network = %self.network,
                        error = %e,
                        attempt,
                        batch_start = start_height,
                        batch_end = end_height,
                        delay_ms = delay.as_millis() as u64,
                        "retrying batch after a classified-retryable error"
                    );

                    tokio::time::sleep(delay).await;
                    delay = self.config.backoff.next(delay);
                }
                Err(e) => {
                    milestones.record_error(error_kind_label(&e));
                    let start_height = batch.first().map(|b| b.height).unwrap_or(0);
                    let end_height = batch.last().map(|b| b.height).unwrap_or(0);
                    tracing::error!(
                        consumer,
                        network = %self.network,
                        error = %e,
                        batch_start = start_height,
                        batch_end = end_height,
                        "fatal error processing batch; halting for operator intervention"
                    );
                    return Err(e);
                }
            }
        }
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
