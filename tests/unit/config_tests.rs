use resequencer_rs::{ConfigError, ResequencerConfig};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResequencerConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert!(!config.reject_old);
        assert!(!config.ignore_invalid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = ResequencerConfig::default()
            .with_capacity(16)
            .with_timeout(Duration::from_millis(250))
            .with_reject_old(true)
            .with_ignore_invalid(true);

        assert_eq!(config.capacity, 16);
        assert_eq!(config.timeout_ms, 250);
        assert!(config.reject_old);
        assert!(config.ignore_invalid);
    }

    #[test]
    fn test_zero_values_rejected() {
        let zero_capacity = ResequencerConfig::default().with_capacity(0);
        assert!(matches!(
            zero_capacity.validate(),
            Err(ConfigError::ZeroCapacity)
        ));

        let zero_timeout = ResequencerConfig::default().with_timeout(Duration::ZERO);
        assert!(matches!(zero_timeout.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = ResequencerConfig::from_json(r#"{ "timeout_ms": 50 }"#).unwrap();
        assert_eq!(config.timeout_ms, 50);
        assert_eq!(config.capacity, 1000);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            ResequencerConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ResequencerConfig::from_json(r#"{ "capacity": 0 }"#),
            Err(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ResequencerConfig::default()
            .with_capacity(32)
            .with_reject_old(true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ResequencerConfig::from_json(&json).unwrap(), config);
    }
}
