//! Getter methods for `ScraperConfig`

use std::path::Path;
use std::time::Duration;

use super::types::ScraperConfig;

impl ScraperConfig {
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&Path> {
        self.chrome_data_dir.as_deref()
    }

    #[must_use]
    pub fn primary_navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_navigation_timeout_secs)
    }

    #[must_use]
    pub fn fallback_navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_navigation_timeout_secs)
    }

    #[must_use]
    pub fn min_usable_document_bytes(&self) -> usize {
        self.min_usable_document_bytes
    }

    #[must_use]
    pub fn intervention_timeout(&self) -> Duration {
        Duration::from_secs(self.intervention_timeout_secs)
    }

    #[must_use]
    pub fn intervention_poll_interval(&self) -> Duration {
        Duration::from_millis(self.intervention_poll_interval_ms)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn max_results_per_source(&self) -> usize {
        self.max_results_per_source
    }

    #[must_use]
    pub fn max_reviews(&self) -> usize {
        self.max_reviews
    }

    #[must_use]
    pub fn max_concurrent_sessions(&self) -> usize {
        self.max_concurrent_sessions
    }

    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    #[must_use]
    pub fn circuit_breaker_enabled(&self) -> bool {
        self.circuit_breaker_enabled
    }

    #[must_use]
    pub fn circuit_breaker_failure_threshold(&self) -> u32 {
        self.circuit_breaker_failure_threshold
    }

    #[must_use]
    pub fn circuit_breaker_retry_delay(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_retry_delay_secs)
    }

    #[must_use]
    pub fn rules_dir(&self) -> Option<&Path> {
        self.rules_dir.as_deref()
    }

    #[must_use]
    pub fn sources(&self) -> Option<&[String]> {
        self.sources.as_deref()
    }
}
