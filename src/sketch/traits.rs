use crate::sketch::error::Result;
use std::time::Duration;

/// Core operations for a decaying distinct-count sketch
pub trait DistinctSketchOps {
    /// Record an observation in every slot of the ring
    fn observe(&self, item: &[u8]) -> Result<()>;

    /// Copy of the registers of the current slot
    fn snapshot(&self) -> Result<Vec<u8>>;

    /// Cardinality estimate over the current slot
    fn estimate(&self) -> Result<f64>;

    /// Zero every slot and restart the window
    fn clear(&self) -> Result<()>;
}

/// Bulk operations, one lock acquisition per batch
pub trait BulkDistinctSketchOps {
    fn observe_bulk(&self, items: &[&[u8]]) -> Result<()>;
}

/// Static shape of a decaying sketch
pub trait DistinctSketchStats {
    fn log_size(&self) -> u32;
    fn register_count(&self) -> usize;
    fn age_buckets(&self) -> usize;
    fn max_age(&self) -> Duration;
    fn sub_window(&self) -> Duration;
}
