//! Core configuration type

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScrapeError, ScrapeResult};
use crate::utils::constants::{
    DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD, DEFAULT_CIRCUIT_BREAKER_RETRY_DELAY_SECS,
    DEFAULT_FALLBACK_NAVIGATION_TIMEOUT_SECS, DEFAULT_INTERVENTION_POLL_INTERVAL_MS,
    DEFAULT_INTERVENTION_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_SESSIONS,
    DEFAULT_MAX_RESULTS_PER_SOURCE, DEFAULT_MAX_REVIEWS, DEFAULT_MIN_USABLE_DOCUMENT_BYTES,
    DEFAULT_PRIMARY_NAVIGATION_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SOURCE_TIMEOUT_SECS,
};

/// Main configuration struct for scraping operations
///
/// Missing keys in a JSON document take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub(crate) headless: bool,

    /// Base directory for per-session Chrome profiles (system temp dir when unset)
    pub(crate) chrome_data_dir: Option<PathBuf>,

    /// Budget for the primary (load event) navigation strategy
    ///
    /// Default: 60 seconds
    pub(crate) primary_navigation_timeout_secs: u64,

    /// Budget for the permissive (document committed) retry
    ///
    /// Default: 30 seconds
    pub(crate) fallback_navigation_timeout_secs: u64,

    pub(crate) min_usable_document_bytes: usize,

    /// Ceiling of the awaiting-intervention state
    ///
    /// Zero disables the wait: a challenged page is immediately a soft failure.
    ///
    /// Default: 120 seconds
    pub(crate) intervention_timeout_secs: u64,
    pub(crate) intervention_poll_interval_ms: u64,

    /// Fixed delay before the one retry of an empty search
    ///
    /// Default: 3000 ms
    pub(crate) retry_delay_ms: u64,

    pub(crate) max_results_per_source: usize,
    pub(crate) max_reviews: usize,

    /// Sources allowed to run at once; each holds one browser process
    ///
    /// Default: 4
    pub(crate) max_concurrent_sessions: usize,

    /// Wall-clock budget of one source call inside a fan-out
    ///
    /// Default: 300 seconds
    pub(crate) source_timeout_secs: u64,

    /// Skip sources that keep failing
    ///
    /// Default: true
    pub(crate) circuit_breaker_enabled: bool,

    /// Consecutive failures before a source's circuit opens
    ///
    /// Default: 5
    pub(crate) circuit_breaker_failure_threshold: u32,

    /// How long an open circuit waits before a half-open trial
    ///
    /// Default: 300 seconds
    pub(crate) circuit_breaker_retry_delay_secs: u64,

    /// Directory of `*.json` rulesets overriding or extending the built-ins
    pub(crate) rules_dir: Option<PathBuf>,

    /// Source ids to register; `None` registers every known ruleset
    pub(crate) sources: Option<Vec<String>>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_data_dir: None,
            primary_navigation_timeout_secs: DEFAULT_PRIMARY_NAVIGATION_TIMEOUT_SECS,
            fallback_navigation_timeout_secs: DEFAULT_FALLBACK_NAVIGATION_TIMEOUT_SECS,
            min_usable_document_bytes: DEFAULT_MIN_USABLE_DOCUMENT_BYTES,
            intervention_timeout_secs: DEFAULT_INTERVENTION_TIMEOUT_SECS,
            intervention_poll_interval_ms: DEFAULT_INTERVENTION_POLL_INTERVAL_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_results_per_source: DEFAULT_MAX_RESULTS_PER_SOURCE,
            max_reviews: DEFAULT_MAX_REVIEWS,
            max_concurrent_sessions: DEFAULT_MAX_CONCURRENT_SESSIONS,
            source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
            circuit_breaker_enabled: true,
            circuit_breaker_failure_threshold: DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            circuit_breaker_retry_delay_secs: DEFAULT_CIRCUIT_BREAKER_RETRY_DELAY_SECS,
            rules_dir: None,
            sources: None,
        }
    }
}

impl ScraperConfig {
    /// Load a JSON configuration document and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> ScrapeResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            ScrapeError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds every component relies on
    pub fn validate(&self) -> ScrapeResult<()> {
        let positive = [
            ("primary_navigation_timeout_secs", self.primary_navigation_timeout_secs),
            ("fallback_navigation_timeout_secs", self.fallback_navigation_timeout_secs),
            ("intervention_poll_interval_ms", self.intervention_poll_interval_ms),
            ("source_timeout_secs", self.source_timeout_secs),
            ("max_results_per_source", self.max_results_per_source as u64),
            ("max_concurrent_sessions", self.max_concurrent_sessions as u64),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ScrapeError::Config(format!("{name} must be greater than zero")));
        }
        if self.circuit_breaker_enabled && self.circuit_breaker_failure_threshold == 0 {
            return Err(ScrapeError::Config(
                "circuit_breaker_failure_threshold must be greater than zero".to_string(),
            ));
        }
        if let Some(sources) = &self.sources
            && sources.is_empty()
        {
            return Err(ScrapeError::Config("sources must not be empty when set".to_string()));
        }
        Ok(())
    }
}
