use distinct_window_rs::{DecayingSketch, DistinctConfig, DistinctConfigBuilder};
use std::time::{Duration, Instant};

/// Config with an explicit window, built the way callers build it
pub fn test_config(
    log_size: u32,
    max_age: Duration,
    age_buckets: usize,
) -> DistinctConfig {
    DistinctConfigBuilder::default()
        .log_size(log_size)
        .max_age(max_age)
        .age_buckets(age_buckets)
        .build()
        .expect("Failed to build test config")
}

/// Sketch with a one-minute window; nothing rotates during a test
#[allow(dead_code)]
pub fn create_long_window_sketch(log_size: u32) -> DecayingSketch {
    DecayingSketch::new(test_config(log_size, Duration::from_secs(60), 4))
        .expect("Failed to create test sketch")
}

/// Sketch whose clock starts at `start`, for driving rotation by hand
#[allow(dead_code)]
pub fn create_sketch_at(
    log_size: u32,
    max_age: Duration,
    age_buckets: usize,
    start: Instant,
) -> DecayingSketch {
    DecayingSketch::new_at(test_config(log_size, max_age, age_buckets), start)
        .expect("Failed to create test sketch")
}

/// Consistent distinct observations: `{prefix}0`, `{prefix}1`, ...
#[allow(dead_code)]
pub fn generate_test_items(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("{prefix}{i}").into_bytes())
        .collect()
}
