//! Prometheus metrics for the indexing pipeline.
//!
//! Naming convention: `indexer_<concern>_<unit>`. Counts, durations, and
//! rates live here rather than in log lines, per the platform's
//! observability contract.

use lazy_static::lazy_static;
use prometheus::{exponential_buckets, CounterVec, GaugeVec, HistogramVec, Opts, Registry};

lazy_static! {
    /// Global metrics registry; adapters register against this at startup.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Last committed checkpoint height, per consumer.
    pub static ref CHECKPOINT_HEIGHT: GaugeVec = GaugeVec::new(
        Opts::new("indexer_checkpoint_height", "Last fully committed height per consumer"),
        &["consumer", "network"],
    ).expect("metric creation failed");

    /// Items (blocks/rows/edges) processed per consumer, cumulative.
    pub static ref ITEMS_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("indexer_items_processed_total", "Items processed per consumer"),
        &["consumer", "network"],
    ).expect("metric creation failed");

    /// Batch processing duration.
    pub static ref BATCH_DURATION: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "indexer_batch_duration_seconds",
            "Time spent processing one consumer batch",
        ).buckets(exponential_buckets(0.001, 2.0, 16).unwrap()),
        &["consumer", "network"],
    ).expect("metric creation failed");

    /// Errors observed, by consumer and classified kind.
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("indexer_errors_total", "Errors observed per consumer, by kind"),
        &["consumer", "network", "kind"],
    ).expect("metric creation failed");

    /// How far behind the chain tip a consumer currently is.
    pub static ref LAG_BLOCKS: GaugeVec = GaugeVec::new(
        Opts::new("indexer_lag_blocks", "Blocks between a consumer's checkpoint and chain tip"),
        &["consumer", "network"],
    ).expect("metric creation failed");
}

/// Registers every metric above with [`REGISTRY`]. Idempotent-by-construction:
/// call once per process at startup, before the consumer runtime loop starts.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(CHECKPOINT_HEIGHT.clone()))?;
    REGISTRY.register(Box::new(ITEMS_PROCESSED.clone()))?;
    REGISTRY.register(Box::new(BATCH_DURATION.clone()))?;
    REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(LAG_BLOCKS.clone()))?;
    Ok(())
}

/// Encodes the current registry state as Prometheus text exposition format,
/// for a metrics endpoint the ambient deployment wiring scrapes.
pub fn encode() -> String {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("prometheus encoding is infallible for well-formed metrics");
    String::from_utf8(buffer).expect("prometheus text output is always valid utf-8")
}
