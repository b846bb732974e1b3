//! Error taxonomy for scraping operations
//!
//! Only the failures a caller can act on are raised. Anti-bot blocks and
//! empty extractions are soft failures and never appear here; they resolve
//! to an empty result inside the adapter.

use thiserror::Error;

/// Result type alias for scraping operations
pub type ScrapeResult<T> = Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page failed to load under both the primary and the fallback strategy
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// No adapter is registered for the requested source
    #[error("No adapter registered for source '{0}'")]
    AdapterNotFound(String),

    /// Browser could not be launched, configured or driven
    #[error("Browser error: {0}")]
    Browser(String),

    /// A ruleset contains a selector or pattern that does not compile
    #[error("Invalid rule for site '{site}', field '{field}': {reason}")]
    InvalidRule {
        site: String,
        field: String,
        reason: String,
    },

    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source did not finish within its time budget
    #[error("Source '{site}' exceeded its {secs}s budget")]
    BudgetExceeded { site: String, secs: u64 },

    /// Neither re-search nor the listing page produced a current price
    #[error("Product is no longer available at {url}")]
    ProductUnavailable { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

impl ScrapeError {
    /// Whether a search may downgrade this error to an empty result
    ///
    /// Navigation and browser failures are expected when scraping hostile
    /// storefronts. Rule and configuration errors are programming errors and
    /// must surface.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::Browser(_))
    }

    pub(crate) fn navigation(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
