//! Tests for configuration defaults, the builder, and JSON loading

use pricewatch_scraper::ScrapeError;
use pricewatch_scraper::config::ScraperConfig;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = ScraperConfig::default();

    assert!(config.headless());
    assert_eq!(config.chrome_data_dir(), None);
    assert_eq!(config.primary_navigation_timeout(), Duration::from_secs(60));
    assert_eq!(config.fallback_navigation_timeout(), Duration::from_secs(30));
    assert_eq!(config.intervention_timeout(), Duration::from_secs(120));
    assert_eq!(config.retry_delay(), Duration::from_millis(3_000));
    assert_eq!(config.max_results_per_source(), 20);
    assert_eq!(config.max_reviews(), 5);
    assert_eq!(config.max_concurrent_sessions(), 4);
    assert!(config.circuit_breaker_enabled());
    assert_eq!(config.sources(), None);
}

#[test]
fn test_builder_with_all_optional_fields() {
    let config = ScraperConfig::builder()
        .headless(false)
        .chrome_data_dir(Some("/tmp/pw-profiles"))
        .primary_navigation_timeout_secs(45)
        .fallback_navigation_timeout_secs(15)
        .min_usable_document_bytes(2048)
        .intervention_timeout_secs(0)
        .intervention_poll_interval_ms(500)
        .retry_delay_ms(100)
        .max_results_per_source(10)
        .max_reviews(3)
        .max_concurrent_sessions(2)
        .source_timeout_secs(90)
        .circuit_breaker_enabled(false)
        .rules_dir(Some("/etc/pricewatch/rules"))
        .sources(Some(vec!["ebay".into()]))
        .build()
        .unwrap();

    assert!(!config.headless());
    assert_eq!(config.chrome_data_dir(), Some(Path::new("/tmp/pw-profiles")));
    assert_eq!(config.primary_navigation_timeout(), Duration::from_secs(45));
    assert_eq!(config.fallback_navigation_timeout(), Duration::from_secs(15));
    assert_eq!(config.min_usable_document_bytes(), 2048);
    assert_eq!(config.intervention_timeout(), Duration::ZERO);
    assert_eq!(config.intervention_poll_interval(), Duration::from_millis(500));
    assert_eq!(config.max_reviews(), 3);
    assert_eq!(config.source_timeout(), Duration::from_secs(90));
    assert!(!config.circuit_breaker_enabled());
    assert_eq!(config.rules_dir(), Some(Path::new("/etc/pricewatch/rules")));
    assert_eq!(config.sources(), Some(&["ebay".to_string()][..]));
}

#[test]
fn test_builder_rejects_zero_bounds() {
    for result in [
        ScraperConfig::builder().primary_navigation_timeout_secs(0).build(),
        ScraperConfig::builder().max_results_per_source(0).build(),
        ScraperConfig::builder().source_timeout_secs(0).build(),
        ScraperConfig::builder().circuit_breaker_failure_threshold(0).build(),
        ScraperConfig::builder().sources(Some(Vec::new())).build(),
    ] {
        assert!(matches!(result, Err(ScrapeError::Config(_))), "{result:?}");
    }
}

#[test]
fn test_json_file_fills_missing_keys_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scraper.json");
    std::fs::write(
        &path,
        r#"{ "headless": false, "max_concurrent_sessions": 2, "sources": ["amazon", "ebay"] }"#,
    )
    .unwrap();

    let config = ScraperConfig::from_json_file(&path).unwrap();

    assert!(!config.headless());
    assert_eq!(config.max_concurrent_sessions(), 2);
    assert_eq!(config.sources().map(<[String]>::len), Some(2));
    assert_eq!(config.primary_navigation_timeout(), Duration::from_secs(60));
}

#[test]
fn test_json_file_is_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scraper.json");
    std::fs::write(&path, r#"{ "max_results_per_source": 0 }"#).unwrap();

    let err = ScraperConfig::from_json_file(&path).unwrap_err();
    assert!(err.to_string().contains("max_results_per_source"));
}

#[test]
fn test_missing_json_file_is_a_config_error() {
    let err = ScraperConfig::from_json_file("/nonexistent/pricewatch.json").unwrap_err();
    assert!(matches!(err, ScrapeError::Config(_)));
}
