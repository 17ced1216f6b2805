//! Sliding-window HyperLogLog sketch
pub mod config;
pub mod error;
pub mod estimator;
pub mod registers;
pub mod traits;
pub mod window;

pub use config::{
    DistinctConfig, DistinctConfigBuilder, DistinctConfigBuilderError,
    MAX_LOG_SIZE, MIN_LOG_SIZE,
};
pub use error::{DistinctError, Result};
pub use estimator::{alpha, estimate, raw_estimate};
pub use registers::RegisterSketch;
pub use traits::{BulkDistinctSketchOps, DistinctSketchOps, DistinctSketchStats};
pub use window::DecayingSketch;
