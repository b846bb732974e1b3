pub mod adapter;
pub mod antibot;
pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod error;
pub mod extraction;
pub mod kromekover;
pub mod normalizer;
pub mod orchestrator;
pub mod session;
pub mod types;
pub mod utils;

pub use adapter::{ProductSource, SiteAdapter, build_adapters, builtin_rulesets, resolve_rulesets};
pub use antibot::{ChallengeDetector, ChallengeOutcome, InterventionPolicy, detect_challenge};
pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::ScraperConfig;
pub use error::{ScrapeError, ScrapeResult};
pub use extraction::{CompiledRuleset, RelevanceFilter, SelectorRule, SiteRuleset};
pub use normalizer::{Amount, CanonicalPrice, Currency, parse_price};
pub use orchestrator::{CircuitBreaker, Orchestrator, same_listing};
pub use session::{
    ChromiumSession, ChromiumSessionFactory, NavigateOptions, NavigationOutcome, RenderSession,
    SessionFactory, SessionState,
};
pub use types::{PriceUpdate, Product, Review, SiteProductId};

/// Search every built-in (or configured) storefront once with a throwaway orchestrator
pub async fn search(query: &str, config: ScraperConfig) -> ScrapeResult<Vec<Product>> {
    let orchestrator = Orchestrator::from_config(config)?;
    Ok(orchestrator.search_all_sources(query).await)
}
