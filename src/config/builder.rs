//! Fluent builder for `ScraperConfig`

use super::types::ScraperConfig;
use crate::error::ScrapeResult;

/// Builder starting from the defaults; `build()` validates
#[derive(Debug, Clone, Default)]
pub struct ScraperConfigBuilder {
    pub(crate) config: ScraperConfig,
}

impl ScraperConfig {
    /// Create a builder for configuring a `ScraperConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::default()
    }
}

/// Continue configuring a loaded config, e.g. to apply command-line overrides
impl From<ScraperConfig> for ScraperConfigBuilder {
    fn from(config: ScraperConfig) -> Self {
        Self { config }
    }
}

impl ScraperConfigBuilder {
    pub fn build(self) -> ScrapeResult<ScraperConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    #[test]
    fn defaults_are_valid() {
        let config = ScraperConfig::builder().build().unwrap();
        assert_eq!(config, ScraperConfig::default());
    }

    #[test]
    fn zero_pool_is_rejected() {
        let err = ScraperConfig::builder().max_concurrent_sessions(0).build().unwrap_err();
        assert!(matches!(err, ScrapeError::Config(msg) if msg.contains("max_concurrent_sessions")));
    }

    #[test]
    fn zero_intervention_timeout_is_allowed() {
        let config = ScraperConfig::builder().intervention_timeout_secs(0).build().unwrap();
        assert!(config.intervention_timeout().is_zero());
    }

    #[test]
    fn empty_source_list_is_rejected() {
        assert!(ScraperConfig::builder().sources(Some(Vec::new())).build().is_err());
    }
}
