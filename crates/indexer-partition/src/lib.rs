//! Height-to-partition mapping, shared by every store that partitions by
//! height so coordinated pruning stays possible across stores.

use indexer_types::Height;

/// Default partition size: a few thousand blocks.
pub const DEFAULT_PARTITION_SIZE: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    size: u32,
}

impl Partitioner {
    pub fn new(size: u32) -> Self {
        assert!(size > 0, "partition size must be positive");
        Partitioner { size }
    }

    pub fn partition_of(&self, height: Height) -> u32 {
        height / self.size
    }

    pub fn partition_size(&self) -> u32 {
        self.size
    }

    /// Inclusive `[start, end]` height range covered by `partition`.
    pub fn range_of(&self, partition: u32) -> (Height, Height) {
        let start = partition * self.size;
        let end = start + self.size - 1;
        (start, end)
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Partitioner::new(DEFAULT_PARTITION_SIZE)
    }
}
