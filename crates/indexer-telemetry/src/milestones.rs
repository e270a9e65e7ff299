//! Progress milestone reporting: rate-limited "Processed N blocks..." lines
//! and one-shot "business decision" log lines (resume vs. cold start,
//! catching-up). No per-block log lines are ever emitted in steady state.

use crate::metrics;
use indexer_types::Height;
use std::time::Instant;

pub struct Milestones {
    consumer: &'static str,
    network: String,
    interval: u32,
    since_last_milestone: u32,
    batch_started_at: Instant,
    logged_catching_up: bool,
}

impl Milestones {
    pub fn new(consumer: &'static str, network: impl Into<String>, interval: u32) -> Self {
        Milestones {
            consumer,
            network: network.into(),
            interval: interval.max(1),
            since_last_milestone: 0,
            batch_started_at: Instant::now(),
            logged_catching_up: false,
        }
    }

    /// Emits the one-time business decision describing how this consumer is
    /// starting up.
    pub fn log_startup_decision(&self, checkpoint: Height) {
        if checkpoint == 0 {
            tracing::info!(consumer = self.consumer, network = %self.network, "starting from genesis: no checkpoint found");
        } else {
            tracing::info!(consumer = self.consumer, network = %self.network, checkpoint, "resuming from checkpoint");
        }
    }

    /// Logs "catching up" exactly once per process lifetime, the first time
    /// the gap between checkpoint and tip is large.
    pub fn maybe_log_catching_up(&mut self, checkpoint: Height, tip: Height, threshold: u32) {
        let behind = tip.saturating_sub(checkpoint);
        metrics::LAG_BLOCKS
            .with_label_values(&[self.consumer, &self.network])
            .set(behind as f64);

        if !self.logged_catching_up && behind > threshold {
            tracing::info!(
                consumer = self.consumer,
                network = %self.network,
                checkpoint,
                tip,
                behind,
                "catching up to chain tip"
            );
            self.logged_catching_up = true;
        }
    }

    pub fn start_batch(&mut self) {
        self.batch_started_at = Instant::now();
    }

    /// Records a committed batch and, if the milestone interval has been
    /// crossed, logs the progress line and resets the counter.
    pub fn record_batch(&mut self, start_height: Height, end_height: Height, items: u64) {
        let elapsed = self.batch_started_at.elapsed();
        let blocks = end_height.saturating_sub(start_height) as u64 + 1;

        metrics::CHECKPOINT_HEIGHT
            .with_label_values(&[self.consumer, &self.network])
            .set(end_height as f64);
        metrics::ITEMS_PROCESSED
            .with_label_values(&[self.consumer, &self.network])
            .inc_by(items as f64);
        metrics::BATCH_DURATION
            .with_label_values(&[self.consumer, &self.network])
            .observe(elapsed.as_secs_f64());

        self.since_last_milestone += blocks as u32;
        if self.since_last_milestone >= self.interval {
            tracing::info!(
                consumer = self.consumer,
                network = %self.network,
                blocks,
                start_height,
                end_height,
                items,
                elapsed_secs = elapsed.as_secs_f64(),
                "processed blocks (height {start_height}-{end_height}) with {items} items in {:.3}s",
                elapsed.as_secs_f64(),
            );
            self.since_last_milestone = 0;
        }
    }

    pub fn record_error(&self, kind: &str) {
        metrics::ERRORS_TOTAL
            .with_label_values(&[self.consumer, &self.network, kind])
            .inc();
    }
}
