//! Error kinds shared by every component, and their retry classification.

use thiserror::Error;

/// Whether an [`IndexerError`] should be retried with backoff or treated as
/// fatal (propagated to the top of the consumer process).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable,
    Fatal,
}

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("chain node unavailable: {0}")]
    ChainUnavailable(String),

    #[error("malformed chain data at height {height}, event {event_id:?}: {reason}")]
    ChainMalformed {
        height: u32,
        event_id: Option<String>,
        reason: String,
    },

    #[error("destination store transient error: {0}")]
    StorageTransient(String),

    #[error("destination store fatal error: {0}")]
    StorageFatal(String),

    #[error("schema migration failed: {0}")]
    SchemaError(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl IndexerError {
    pub fn classify(&self) -> ErrorClass {
        match self {
            IndexerError::ChainUnavailable(_) | IndexerError::StorageTransient(_) => {
                ErrorClass::Retryable
            }
            IndexerError::ChainMalformed { .. }
            | IndexerError::StorageFatal(_)
            | IndexerError::SchemaError(_)
            | IndexerError::InvariantViolation(_)
            | IndexerError::ConfigError(_) => ErrorClass::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.classify() == ErrorClass::Retryable
    }
}
