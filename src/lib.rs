//! Distinct counting over a sliding time window, for metrics instrumentation.
//!
//! Observations are opaque byte strings (request ids, user ids, ...). They are
//! never stored: each one is hashed into a HyperLogLog register array, and
//! old observations age out through a ring of staggered register arrays.
//!
//! HowTo:
//!    * Projection: a 64-bit hash of the observation is split into a register
//!      index (low `log_size` bits) and a rank (leading zeros of the rest).
//!    * Slots: the ring holds `age_buckets` register arrays. Every observation
//!      raises its register in every slot.
//!    * Rotation: each time a sub-window (`max_age / age_buckets`) passes, the
//!      current slot is cleared and the pointer moves on, so the cleared slot
//!      becomes the freshest one.
//!
//! Reads:
//!     * A read rotates first, then copies the current slot: the one that has
//!       been accumulating the longest, covering roughly `max_age`.
//!     * The copy is exported as registers, not as a number, so several
//!       processes can be merged by element-wise max before estimating.
//!
//! Obvious problems:
//!     * The window edge is fuzzy by up to one sub-window.
//!     * Reads rotate, so readers and writers share one exclusive lock.
//!     * Ranks start at `log_size`; use [`estimate`] (not [`raw_estimate`])
//!       on registers produced here.

pub mod common;
pub mod counter;
mod hash;
pub mod sketch;

pub use counter::{
    DistinctCounter, DistinctCounterOpts, DistinctCounterOptsBuilder,
    DistinctCounterOptsBuilderError, MetricFamily, MetricKind, REGISTER_LABEL,
    RegisterSample,
};
pub use hash::{HASH_SEED, Projection, default_hash_function, project, project_hash};
pub use sketch::{
    BulkDistinctSketchOps, DecayingSketch, DistinctConfig, DistinctConfigBuilder,
    DistinctConfigBuilderError, DistinctError, DistinctSketchOps,
    DistinctSketchStats, RegisterSketch, Result, estimate, raw_estimate,
};
