//! Schema Manager: idempotent DDL application on startup. Every store
//! (block stream, columnar transfers/series/assets, graph) ships its DDL
//! as an ordered list of chunks; already-present objects are silently
//! skipped; any chunk error halts startup with
//! [`IndexerError::SchemaError`].

use indexer_types::IndexerError;

/// One DDL statement plus the name logged if it fails, so an operator can
/// tell which object a startup failure points at.
#[derive(Debug, Clone)]
pub struct DdlChunk {
    pub object_name: String,
    pub statement: String,
}

impl DdlChunk {
    pub fn new(object_name: impl Into<String>, statement: impl Into<String>) -> Self {
        DdlChunk {
            object_name: object_name.into(),
            statement: statement.into(),
        }
    }
}

/// Outcome of applying a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Created,
    AlreadyPresent,
}

/// A store capable of applying its own DDL statements. Implementations
/// decide how "already present" is detected (e.g. `IF NOT EXISTS`, a schema
/// version row, or a catalog lookup) — the schema manager only orchestrates
/// ordering and the final summary.
pub trait SchemaTarget: Send + Sync {
    /// Name used in startup logs (e.g. "block-stream", "columnar-transfers").
    fn target_name(&self) -> &'static str;

    fn ddl_chunks(&self) -> Vec<DdlChunk>;

    /// Applies one chunk. Must be idempotent: applying an already-applied
    /// chunk again returns `AlreadyPresent` rather than erroring.
    fn apply_chunk(&self, chunk: &DdlChunk) -> Result<ChunkOutcome, IndexerError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaSummary {
    pub created: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl SchemaSummary {
    fn record(&mut self, outcome: &Result<ChunkOutcome, IndexerError>) {
        match outcome {
            Ok(ChunkOutcome::Created) => self.created += 1,
            Ok(ChunkOutcome::AlreadyPresent) => self.skipped += 1,
            Err(_) => self.errors += 1,
        }
    }
}

/// Applies every chunk of `target`'s DDL in order, halting on the first
/// error. Logs only the final summary (`n created, k skipped, e errors`),
/// per the observability contract's "no per-chunk log lines" rule.
pub fn apply(target: &dyn SchemaTarget) -> Result<SchemaSummary, IndexerError> {
    let mut summary = SchemaSummary::default();

    for chunk in target.ddl_chunks() {
        let outcome = target.apply_chunk(&chunk);
        summary.record(&outcome);

        match outcome {
            Ok(_) => {}
            Err(e) => {
                tracing::error!(
                    target = target.target_name(),
                    object = %chunk.object_name,
                    error = %e,
                    "schema migration failed"
                );
                return Err(IndexerError::SchemaError(format!(
                    "{}: failed applying {}: {e}",
                    target.target_name(),
                    chunk.object_name
                )));
            }
        }
    }

    tracing::info!(
        target = target.target_name(),
        created = summary.created,
        skipped = summary.skipped,
        errors = summary.errors,
        "schema migration summary"
    );
    Ok(summary)
}

/// Applies DDL for every target, in the order given (so dependency order
/// between stores — e.g. block stream before checkpoint — is the caller's
/// responsibility), halting at the first failure.
pub fn apply_all(targets: &[&dyn SchemaTarget]) -> Result<Vec<SchemaSummary>, IndexerError> {
    targets.iter().map(|t| apply(*t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    struct FakeTarget {
        chunks: Vec<DdlChunk>,
        applied: Mutex<HashSet<String>>,
        fail_on: Option<String>,
    }

    impl SchemaTarget for FakeTarget {
        fn target_name(&self) -> &'static str {
            "fake-store"
        }

        fn ddl_chunks(&self) -> Vec<DdlChunk> {
            self.chunks.clone()
        }

        fn apply_chunk(&self, chunk: &DdlChunk) -> Result<ChunkOutcome, IndexerError> {
            if self.fail_on.as_deref() == Some(chunk.object_name.as_str()) {
                return Err(IndexerError::SchemaError("simulated ddl failure".into()));
            }
            let mut applied = self.applied.lock();
            if applied.insert(chunk.object_name.clone()) {
                Ok(ChunkOutcome::Created)
            } else {
                Ok(ChunkOutcome::AlreadyPresent)
            }
        }
    }

    #[test]
    fn first_run_creates_every_chunk() {
        let target = FakeTarget {
            chunks: vec![DdlChunk::new("blocks", "CREATE TABLE blocks"), DdlChunk::new("events", "CREATE TABLE events")],
            applied: Mutex::new(HashSet::new()),
            fail_on: None,
        };
        let summary = apply(&target).unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn a_second_run_skips_already_present_objects() {
        let target = FakeTarget {
            chunks: vec![DdlChunk::new("blocks", "CREATE TABLE blocks")],
            applied: Mutex::new(HashSet::new()),
            fail_on: None,
        };
        apply(&target).unwrap();
        let summary = apply(&target).unwrap();
        assert_eq!(summary.created, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn a_chunk_error_halts_and_is_reported_as_schema_error() {
        let target = FakeTarget {
            chunks: vec![DdlChunk::new("blocks", "CREATE TABLE blocks"), DdlChunk::new("bad", "CREATE TABLE bad")],
            applied: Mutex::new(HashSet::new()),
            fail_on: Some("bad".to_string()),
        };
        let err = apply(&target).unwrap_err();
        assert!(matches!(err, IndexerError::SchemaError(_)));
    }

    #[test]
    fn apply_all_stops_at_the_first_failing_target() {
        let good = FakeTarget {
            chunks: vec![DdlChunk::new("a", "CREATE TABLE a")],
            applied: Mutex::new(HashSet::new()),
            fail_on: None,
        };
        let bad = FakeTarget {
            chunks: vec![DdlChunk::new("b", "CREATE TABLE b")],
            applied: Mutex::new(HashSet::new()),
            fail_on: Some("b".to_string()),
        };
        let err = apply_all(&[&good, &bad]).unwrap_err();
        assert!(matches!(err, IndexerError::SchemaError(_)));
    }
}
