//! Storefront adapters
//!
//! Every storefront is served by the same [`SiteAdapter`] engine; what differs
//! between sources is the ruleset it was built from. The orchestrator only
//! sees the [`ProductSource`] contract, so tests and callers can register
//! their own implementations.

pub mod registry;
pub mod site;

use async_trait::async_trait;

use crate::error::ScrapeResult;
use crate::types::Product;

pub use registry::{build_adapters, builtin_rulesets, load_rules_dir, resolve_rulesets};
pub use site::SiteAdapter;

/// Search and detail contract shared by every source
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Identity stamped on every product as `source_id`
    fn source_id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Listings relevant to `query`, in page order
    ///
    /// Expected failures (anti-bot block, navigation failure, nothing
    /// extractable) resolve to an empty list. Only programming errors are
    /// returned as `Err`.
    async fn search_products(&self, query: &str) -> ScrapeResult<Vec<Product>>;

    /// One listing page, with reviews
    ///
    /// `Ok(None)` when the page was blocked or nothing could be extracted;
    /// navigation failures are returned as errors.
    async fn get_product_details(&self, url: &str) -> ScrapeResult<Option<Product>>;
}
