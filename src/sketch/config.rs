use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_LOG_SIZE: u32 = 4;
pub const MAX_LOG_SIZE: u32 = 31;

/// Shape of one decaying sketch: register count and time window.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DistinctConfig {
    /// log2 of the register count
    #[builder(default = "8")]
    pub log_size: u32,
    /// Total length of the sliding window
    #[builder(default = "Duration::from_secs(60)")]
    pub max_age: Duration,
    /// Number of staggered slots the window is split into
    #[builder(default = "4")]
    pub age_buckets: usize,
}

impl Default for DistinctConfig {
    fn default() -> Self {
        Self {
            log_size: 8,
            max_age: Duration::from_secs(60),
            age_buckets: 4,
        }
    }
}

impl DistinctConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.log_size < MIN_LOG_SIZE || self.log_size > MAX_LOG_SIZE {
            return Err(format!(
                "Log size must be within {MIN_LOG_SIZE} and {MAX_LOG_SIZE}, got {}",
                self.log_size
            ));
        }
        if self.max_age.is_zero() {
            return Err("Max age must be greater than 0".to_string());
        }
        if self.age_buckets == 0 {
            return Err("Age buckets must be greater than 0".to_string());
        }
        if self.max_age.as_millis() / (self.age_buckets as u128) < 1 {
            return Err(format!(
                "Sub-window must be at least 1ms: max age {:?} split into {} buckets",
                self.max_age, self.age_buckets
            ));
        }
        Ok(())
    }

    /// Number of registers per slot, `2^log_size`.
    pub fn register_count(&self) -> usize {
        1usize << self.log_size
    }

    /// Rotation granularity, truncated to whole milliseconds.
    pub fn sub_window(&self) -> Duration {
        let millis = self.max_age.as_millis() / (self.age_buckets as u128).max(1);
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Bytes held by the register slots of one sketch.
    pub fn memory_footprint(&self) -> usize {
        self.register_count() * self.age_buckets
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = DistinctConfigBuilder::default().build().unwrap();
        assert_eq!(built, DistinctConfig::default());
        assert!(built.validate().is_ok());
    }

    #[test]
    fn test_sub_window_truncates_to_millis() {
        let config = DistinctConfigBuilder::default()
            .max_age(Duration::from_secs(60))
            .age_buckets(7usize)
            .build()
            .unwrap();
        assert_eq!(config.sub_window(), Duration::from_millis(8571));
    }

    #[test]
    fn test_register_count_and_footprint() {
        let config = DistinctConfigBuilder::default()
            .log_size(12u32)
            .age_buckets(3usize)
            .build()
            .unwrap();
        assert_eq!(config.register_count(), 4096);
        assert_eq!(config.memory_footprint(), 4096 * 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DistinctConfigBuilder::default()
            .log_size(10u32)
            .max_age(Duration::from_millis(1500))
            .build()
            .unwrap();
        let bytes = config.to_bytes().unwrap();
        assert_eq!(DistinctConfig::from_bytes(&bytes).unwrap(), config);
    }
}
