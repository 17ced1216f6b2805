use crate::hash::project;
use crate::sketch::config::DistinctConfig;
use crate::sketch::error::{DistinctError, Result};
use crate::sketch::estimator;
use crate::sketch::registers::RegisterSketch;
use crate::sketch::traits::{
    BulkDistinctSketchOps, DistinctSketchOps, DistinctSketchStats,
};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Mutable state of the ring. Always accessed as one unit under the lock.
#[derive(Debug)]
struct Ring {
    slots: Vec<RegisterSketch>,
    current: usize,
    last_rotate: Instant,
}

impl Ring {
    fn new(config: &DistinctConfig, start: Instant) -> Self {
        let slots = (0..config.age_buckets)
            .map(|_| RegisterSketch::new(config.register_count()))
            .collect();

        Self {
            slots,
            current: 0,
            last_rotate: start,
        }
    }

    /// Ages the ring up to `now` and returns the number of sub-windows that
    /// elapsed.
    ///
    /// Equivalent to clearing the current slot and advancing the pointer once
    /// per whole sub-window strictly exceeded, but clears at most
    /// `age_buckets` slots however long the ring sat idle.
    fn rotate(&mut self, now: Instant, sub_window: Duration) -> u128 {
        let elapsed = now.saturating_duration_since(self.last_rotate);
        if elapsed <= sub_window {
            return 0;
        }

        let sub_nanos = sub_window.as_nanos();
        let elapsed_windows = (elapsed.as_nanos() - 1) / sub_nanos;

        let buckets = self.slots.len();
        let clears = elapsed_windows.min(buckets as u128) as usize;
        for step in 0..clears {
            let idx = (self.current + step) % buckets;
            self.slots[idx].clear();
        }

        self.current =
            (self.current + (elapsed_windows % buckets as u128) as usize) % buckets;
        self.last_rotate += duration_from_nanos(elapsed_windows * sub_nanos);

        if clears == buckets {
            trace!(
                elapsed_windows = elapsed_windows as u64,
                "idle gap cleared every slot"
            );
        }
        debug!(
            elapsed_windows = elapsed_windows as u64,
            cleared = clears,
            current = self.current,
            "rotated ring"
        );

        elapsed_windows
    }

    fn increment_max(&mut self, index: usize, rank: u8) {
        for slot in self.slots.iter_mut() {
            slot.update(index, rank);
        }
    }

    fn current(&self) -> &RegisterSketch {
        &self.slots[self.current]
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    Duration::new(
        u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX),
        (nanos % NANOS_PER_SEC) as u32,
    )
}

/// HyperLogLog registers over a sliding time window.
///
/// The window is split into `age_buckets` slots that were last cleared one
/// sub-window apart. Every observation lands in every slot; reads expose the
/// slot that has accumulated the longest, which covers roughly `max_age`.
/// One mutex guards the slots, the current pointer and the rotation clock,
/// and reads take it too because they rotate.
pub struct DecayingSketch {
    config: DistinctConfig,
    register_count: usize,
    sub_window: Duration,
    ring: Mutex<Ring>,
}

impl DecayingSketch {
    pub fn new(config: DistinctConfig) -> Result<Self> {
        Self::new_at(config, Instant::now())
    }

    /// Creates a sketch whose rotation clock starts at `start`.
    pub fn new_at(config: DistinctConfig, start: Instant) -> Result<Self> {
        config.validate()?;

        let register_count = config.register_count();
        let sub_window = config.sub_window();
        let ring = Ring::new(&config, start);

        debug!(
            log_size = config.log_size,
            age_buckets = config.age_buckets,
            sub_window_ms = sub_window.as_millis() as u64,
            "created decaying sketch"
        );

        Ok(Self {
            config,
            register_count,
            sub_window,
            ring: Mutex::new(ring),
        })
    }

    pub fn config(&self) -> &DistinctConfig {
        &self.config
    }

    fn lock_ring(&self) -> Result<MutexGuard<'_, Ring>> {
        self.ring.lock().map_err(|_| {
            DistinctError::LockError("Failed to acquire ring lock".to_string())
        })
    }

    pub fn observe_at(&self, item: &[u8], now: Instant) -> Result<()> {
        let p = project(item, self.config.log_size);
        self.increment_max_at(p.index, p.rank, now)
    }

    /// Rotates, then raises register `index` to at least `rank` in every slot.
    pub fn increment_max(&self, index: usize, rank: u8) -> Result<()> {
        self.increment_max_at(index, rank, Instant::now())
    }

    pub fn increment_max_at(
        &self,
        index: usize,
        rank: u8,
        now: Instant,
    ) -> Result<()> {
        if index >= self.register_count {
            return Err(DistinctError::IndexOutOfBounds {
                index,
                capacity: self.register_count,
            });
        }

        let mut ring = self.lock_ring()?;
        ring.rotate(now, self.sub_window);
        ring.increment_max(index, rank);
        Ok(())
    }

    pub fn observe_bulk_at(&self, items: &[&[u8]], now: Instant) -> Result<()> {
        let projections: Vec<_> = items
            .iter()
            .map(|item| project(item, self.config.log_size))
            .collect();

        let mut ring = self.lock_ring()?;
        ring.rotate(now, self.sub_window);
        for p in projections {
            ring.increment_max(p.index, p.rank);
        }
        Ok(())
    }

    /// Rotates, then copies the current slot.
    pub fn snapshot_at(&self, now: Instant) -> Result<Vec<u8>> {
        let mut ring = self.lock_ring()?;
        ring.rotate(now, self.sub_window);
        Ok(ring.current().to_vec())
    }

    pub fn estimate_at(&self, now: Instant) -> Result<f64> {
        let registers = self.snapshot_at(now)?;
        Ok(estimator::estimate(&registers, self.config.log_size))
    }

    /// Index of the slot reads currently expose. Does not rotate.
    pub fn current_slot(&self) -> Result<usize> {
        Ok(self.lock_ring()?.current)
    }

    pub fn clear_at(&self, now: Instant) -> Result<()> {
        let mut ring = self.lock_ring()?;
        for slot in ring.slots.iter_mut() {
            slot.clear();
        }
        ring.current = 0;
        ring.last_rotate = now;
        Ok(())
    }
}

impl DistinctSketchOps for DecayingSketch {
    fn observe(&self, item: &[u8]) -> Result<()> {
        self.observe_at(item, Instant::now())
    }

    fn snapshot(&self) -> Result<Vec<u8>> {
        self.snapshot_at(Instant::now())
    }

    fn estimate(&self) -> Result<f64> {
        self.estimate_at(Instant::now())
    }

    fn clear(&self) -> Result<()> {
        self.clear_at(Instant::now())
    }
}

impl BulkDistinctSketchOps for DecayingSketch {
    fn observe_bulk(&self, items: &[&[u8]]) -> Result<()> {
        self.observe_bulk_at(items, Instant::now())
    }
}

impl DistinctSketchStats for DecayingSketch {
    fn log_size(&self) -> u32 {
        self.config.log_size
    }

    fn register_count(&self) -> usize {
        self.register_count
    }

    fn age_buckets(&self) -> usize {
        self.config.age_buckets
    }

    fn max_age(&self) -> Duration {
        self.config.max_age
    }

    fn sub_window(&self) -> Duration {
        self.sub_window
    }
}

impl std::fmt::Debug for DecayingSketch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecayingSketch {{ log_size: {}, registers: {}, age_buckets: {}, max_age: {:?}, sub_window: {:?} }}",
            self.config.log_size,
            self.register_count,
            self.config.age_buckets,
            self.config.max_age,
            self.sub_window
        )
    }
}
