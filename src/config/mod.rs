//! Configuration for the scraping engine
//!
//! `ScraperConfig` carries every tunable bound: navigation budgets, the
//! intervention ceiling, retry delay, pool size and circuit breaker settings.
//! It is built through a validating fluent builder or loaded from JSON.

pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

pub use builder::ScraperConfigBuilder;
pub use types::ScraperConfig;
