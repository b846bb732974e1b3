//! Builder setters

use std::path::PathBuf;

use super::builder::ScraperConfigBuilder;

impl ScraperConfigBuilder {
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.config.chrome_data_dir = dir.map(Into::into);
        self
    }

    #[must_use]
    pub fn primary_navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.primary_navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn fallback_navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fallback_navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn min_usable_document_bytes(mut self, bytes: usize) -> Self {
        self.config.min_usable_document_bytes = bytes;
        self
    }

    /// Set the awaiting-intervention ceiling
    ///
    /// Raise it when running headful with an operator at hand; set it to 0
    /// for unattended runs where nobody can solve a challenge.
    #[must_use]
    pub fn intervention_timeout_secs(mut self, secs: u64) -> Self {
        self.config.intervention_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn intervention_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.intervention_poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn max_results_per_source(mut self, max: usize) -> Self {
        self.config.max_results_per_source = max;
        self
    }

    #[must_use]
    pub fn max_reviews(mut self, max: usize) -> Self {
        self.config.max_reviews = max;
        self
    }

    #[must_use]
    pub fn max_concurrent_sessions(mut self, max: usize) -> Self {
        self.config.max_concurrent_sessions = max;
        self
    }

    #[must_use]
    pub fn source_timeout_secs(mut self, secs: u64) -> Self {
        self.config.source_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn circuit_breaker_enabled(mut self, enabled: bool) -> Self {
        self.config.circuit_breaker_enabled = enabled;
        self
    }

    #[must_use]
    pub fn circuit_breaker_failure_threshold(mut self, threshold: u32) -> Self {
        self.config.circuit_breaker_failure_threshold = threshold;
        self
    }

    #[must_use]
    pub fn circuit_breaker_retry_delay_secs(mut self, secs: u64) -> Self {
        self.config.circuit_breaker_retry_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn rules_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.config.rules_dir = dir.map(Into::into);
        self
    }

    /// Restrict the registered sources; `None` registers every known ruleset
    #[must_use]
    pub fn sources(mut self, sources: Option<Vec<String>>) -> Self {
        self.config.sources = sources;
        self
    }
}
