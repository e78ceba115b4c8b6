//! Tests for cache policy configuration.

use std::io::Write;
use std::time::Duration;
use tempfile::Builder;
use turnstile_cache::{
    CacheConfig, CacheConfigBuilder, CallOptions, OperationPolicy, TurnstileConfig,
};
use turnstile_error::{ConfigErrorKind, TurnstileErrorKind};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_load_bundled_defaults() {
    let config = TurnstileConfig::load().unwrap();
    let cache = &config.cache;

    assert_eq!(*cache.cache_time_ms(), 30_000);
    assert_eq!(*cache.throttle_time_ms(), 8_000);
    assert_eq!(*cache.max_attempts(), 3);
    assert_eq!(*cache.max_backoff_ms(), 30_000);
    assert!(!*cache.coalesce_in_flight());
}

#[test]
fn test_bundled_operation_policies() {
    let config = TurnstileConfig::load().unwrap();

    let category = config.cache.resolve("getTicketCategory", CallOptions::new());
    assert_eq!(*category.cache_time(), Duration::from_secs(300));
    assert_eq!(*category.throttle_time(), Duration::from_secs(10));
    assert!(!*category.force_fresh());

    let name = config.cache.resolve("getEventName", CallOptions::new());
    assert_eq!(*name.cache_time(), Duration::from_secs(60));
    assert!(*name.force_fresh());

    let unknown = config.cache.resolve("getSomethingElse", CallOptions::new());
    assert_eq!(*unknown.cache_time(), Duration::from_secs(30));
    assert_eq!(*unknown.throttle_time(), Duration::from_secs(8));
}

#[test]
fn test_config_from_file() {
    let file = write_config(
        r#"
[cache]
cache_time_ms = 5000
coalesce_in_flight = true

[cache.operations.getUserTickets]
throttle_time_ms = 2000
"#,
    );

    let config = TurnstileConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.cache.cache_time_ms(), 5000);
    assert!(*config.cache.coalesce_in_flight());
    // Unspecified fields keep their defaults.
    assert_eq!(*config.cache.throttle_time_ms(), 8000);
    assert_eq!(*config.cache.batch_size(), 3);

    let policy = config.cache.resolve("getUserTickets", CallOptions::new());
    assert_eq!(*policy.cache_time(), Duration::from_millis(5000));
    assert_eq!(*policy.throttle_time(), Duration::from_millis(2000));
}

#[test]
fn test_invalid_file_config_is_rejected() {
    let file = write_config(
        r#"
[cache]
max_attempts = 0
"#,
    );

    let err = TurnstileConfig::from_file(file.path()).unwrap_err();
    match err.kind() {
        TurnstileErrorKind::Config(e) => assert!(matches!(
            e.kind(),
            ConfigErrorKind::Invalid {
                setting: "max_attempts",
                ..
            }
        )),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = TurnstileConfig::from_file(&missing).unwrap_err();
    match err.kind() {
        TurnstileErrorKind::Config(e) => {
            assert!(matches!(e.kind(), ConfigErrorKind::Load(_)))
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_validate() {
    assert!(CacheConfig::default().validate().is_ok());
    assert!(CacheConfig::default().with_batch_size(0).validate().is_err());

    let err = CacheConfig::default()
        .with_backoff_base_ms(60_000)
        .validate()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ConfigErrorKind::Invalid {
            setting: "backoff_base_ms",
            ..
        }
    ));
}

#[test]
fn test_builder_fills_defaults() {
    let config = CacheConfigBuilder::default()
        .max_attempts(5u32)
        .build()
        .unwrap();

    assert_eq!(*config.max_attempts(), 5);
    assert_eq!(*config.cache_time_ms(), 30_000);
    assert_eq!(config.batch_pause(), Duration::from_millis(500));
}

#[test]
fn test_policy_for_only_returns_configured_fields() {
    let mut operations = std::collections::HashMap::new();
    operations.insert(
        "getEvent".to_string(),
        OperationPolicy {
            cache_time_ms: Some(60_000),
            ..Default::default()
        },
    );
    let config = CacheConfig::default().with_operations(operations);

    let options = config.policy_for("getEvent");
    assert_eq!(*options.cache_time(), Some(Duration::from_secs(60)));
    assert_eq!(*options.throttle_time(), None);
    assert_eq!(config.policy_for("getTicket"), CallOptions::new());
}
