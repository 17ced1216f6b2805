use distinct_window_rs::{
    DecayingSketch, DistinctConfig, DistinctConfigBuilder, DistinctError,
};
use std::time::Duration;

#[cfg(test)]
mod log_size_validation_tests {
    use super::*;

    fn with_log_size(log_size: u32) -> DistinctConfig {
        DistinctConfigBuilder::default()
            .log_size(log_size)
            .build()
            .unwrap()
    }

    #[test]
    fn test_log_size_below_minimum_fails() {
        let result = with_log_size(3).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Log size must be within 4 and 31"));
    }

    #[test]
    fn test_log_size_above_maximum_fails() {
        assert!(with_log_size(32).validate().is_err());
        assert!(with_log_size(0).validate().is_err());
    }

    #[test]
    fn test_log_size_bounds_are_inclusive() {
        assert!(with_log_size(4).validate().is_ok());
        assert!(with_log_size(31).validate().is_ok());
    }

    #[test]
    fn test_supplied_value_is_checked_not_default() {
        // A custom value outside the bound must fail even though the
        // default (8) is valid.
        let err = DecayingSketch::new(with_log_size(40)).unwrap_err();
        match err {
            DistinctError::InvalidConfig(msg) => assert!(msg.contains("got 40")),
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod window_validation_tests {
    use super::*;

    #[test]
    fn test_zero_max_age_fails() {
        let config = DistinctConfigBuilder::default()
            .max_age(Duration::ZERO)
            .build()
            .unwrap();
        let err = DecayingSketch::new(config).unwrap_err();
        assert_eq!(
            err,
            DistinctError::InvalidConfig("Max age must be greater than 0".to_string())
        );
    }

    #[test]
    fn test_zero_age_buckets_fails() {
        let config = DistinctConfigBuilder::default()
            .age_buckets(0usize)
            .build()
            .unwrap();
        let err = DecayingSketch::new(config).unwrap_err();
        assert_eq!(
            err,
            DistinctError::InvalidConfig(
                "Age buckets must be greater than 0".to_string()
            )
        );
    }

    #[test]
    fn test_sub_millisecond_sub_window_fails() {
        let config = DistinctConfigBuilder::default()
            .max_age(Duration::from_millis(3))
            .age_buckets(4usize)
            .build()
            .unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Sub-window must be at least 1ms"));
    }

    #[test]
    fn test_one_millisecond_sub_window_is_valid() {
        let config = DistinctConfigBuilder::default()
            .max_age(Duration::from_millis(4))
            .age_buckets(4usize)
            .build()
            .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sub_window(), Duration::from_millis(1));
    }

    #[test]
    fn test_single_bucket_is_valid() {
        let config = DistinctConfigBuilder::default()
            .age_buckets(1usize)
            .build()
            .unwrap();
        let sketch = DecayingSketch::new(config).unwrap();
        assert_eq!(sketch.config().sub_window(), Duration::from_secs(60));
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let json = br#"{"log_size":12,"max_age":{"secs":30,"nanos":0},"age_buckets":3}"#;
        let config = DistinctConfig::from_bytes(json).unwrap();
        assert_eq!(config.log_size, 12);
        assert_eq!(config.max_age, Duration::from_secs(30));
        assert_eq!(config.age_buckets, 3);
        assert_eq!(config.sub_window(), Duration::from_secs(10));
    }

    #[test]
    fn test_malformed_json_maps_to_serialization_error() {
        let err: DistinctError =
            DistinctConfig::from_bytes(b"{not json").unwrap_err().into();
        assert!(matches!(err, DistinctError::SerializationError(_)));
    }
}
