//! Multi-source orchestration
//!
//! The orchestrator owns an explicit list of sources and fans each query out
//! to all of them at once. A source that errors, panics, or overruns its time
//! budget contributes nothing to the aggregate and is logged; it never
//! cancels or delays its siblings. A semaphore caps how many sources (and so
//! browser processes) run at the same time.

pub mod circuit_breaker;

use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::adapter::{ProductSource, build_adapters};
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::session::{ChromiumSessionFactory, SessionFactory};
use crate::types::{PriceUpdate, Product};
use crate::utils::{SESSION_CLOSE_GRACE, canonicalize};

pub use circuit_breaker::{CircuitBreaker, CircuitState, SourceHealth};

pub struct Orchestrator {
    sources: Vec<Arc<dyn ProductSource>>,
    pool: Arc<Semaphore>,
    source_timeout: Duration,
    breaker: Option<Arc<CircuitBreaker>>,
}

impl Orchestrator {
    /// Orchestrate an explicit set of sources
    ///
    /// Registration order is kept: aggregated results list each source's
    /// products in this order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ProductSource>>, config: &ScraperConfig) -> Self {
        let breaker = config.circuit_breaker_enabled().then(|| {
            Arc::new(CircuitBreaker::new(
                config.circuit_breaker_failure_threshold(),
                config.circuit_breaker_retry_delay(),
            ))
        });
        Self {
            sources,
            pool: Arc::new(Semaphore::new(config.max_concurrent_sessions().max(1))),
            source_timeout: config.source_timeout(),
            breaker,
        }
    }

    /// Sources from the built-in and configured rulesets, rendered with Chromium
    pub fn from_config(config: ScraperConfig) -> ScrapeResult<Self> {
        let config = Arc::new(config);
        let sessions: Arc<dyn SessionFactory> = Arc::new(ChromiumSessionFactory::new(Arc::clone(&config)));
        let sources = build_adapters(&config, sessions)?;
        info!(
            "Registered {} sources: {}",
            sources.len(),
            sources.iter().map(|s| s.source_id()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self::new(sources, &config))
    }

    /// Registered source ids, in registration order
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.source_id()).collect()
    }

    #[must_use]
    pub fn source(&self, id: &str) -> Option<&Arc<dyn ProductSource>> {
        self.sources.iter().find(|s| s.source_id() == id)
    }

    #[must_use]
    pub fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        self.breaker.as_deref()
    }

    /// Query every source concurrently and concatenate what they return
    ///
    /// Never fails: each source's failure is isolated to its own slice.
    pub async fn search_all_sources(&self, query: &str) -> Vec<Product> {
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let pool = Arc::clone(&self.pool);
            let breaker = self.breaker.clone();
            let budget = self.source_timeout;
            let query = query.to_string();
            tokio::spawn(async move { run_source(source, &query, pool, breaker, budget).await })
        });
        let settled = join_all(tasks).await;

        let mut products = Vec::new();
        for (source, joined) in self.sources.iter().zip(settled) {
            match joined {
                Ok(found) => products.extend(found),
                Err(e) => {
                    error!("Source {} task failed: {e}", source.source_id());
                    if let Some(breaker) = &self.breaker {
                        breaker.record_failure(source.source_id(), &e.to_string());
                    }
                }
            }
        }
        info!(
            "Search '{query}' across {} sources: {} products",
            self.sources.len(),
            products.len()
        );
        products
    }

    /// Scrape one listing through the source it belongs to
    ///
    /// Errors from the source propagate; there is no other source to fall
    /// back to for a specific listing.
    pub async fn get_product_details(&self, url: &str, source: &str) -> ScrapeResult<Option<Product>> {
        let adapter = self
            .source(source)
            .ok_or_else(|| ScrapeError::AdapterNotFound(source.to_string()))?;
        adapter.get_product_details(url).await
    }

    /// Re-derive the current price of a known product
    ///
    /// Searches all sources by title first and looks for the same listing;
    /// falls back to the listing page itself. Persisting the result is left
    /// to the caller.
    ///
    /// # Errors
    /// `ScrapeError::ProductUnavailable` when neither path yields the product.
    pub async fn refresh_price(&self, existing: &Product) -> ScrapeResult<PriceUpdate> {
        let candidates = self.search_all_sources(&existing.title).await;
        let fresh = match candidates.into_iter().find(|c| same_listing(existing, c)) {
            Some(found) => {
                debug!("Refresh matched {} via search", existing.url);
                found
            }
            None => {
                info!("No search match for {}, scraping listing page", existing.url);
                self.get_product_details(&existing.url, &existing.source_id)
                    .await?
                    .ok_or_else(|| ScrapeError::ProductUnavailable { url: existing.url.clone() })?
            }
        };

        let price_changed = fresh.price != existing.price || fresh.currency != existing.currency;
        if price_changed {
            info!(
                "Price of {} changed: {} {} -> {} {}",
                existing.url, existing.price, existing.currency, fresh.price, fresh.currency
            );
        }
        Ok(PriceUpdate {
            price_changed,
            old_price: existing.price,
            new_price: fresh.price,
            currency: fresh.currency,
            product: fresh,
        })
    }
}

async fn run_source(
    source: Arc<dyn ProductSource>,
    query: &str,
    pool: Arc<Semaphore>,
    breaker: Option<Arc<CircuitBreaker>>,
    budget: Duration,
) -> Vec<Product> {
    let id = source.source_id();
    if let Some(breaker) = &breaker
        && !breaker.should_attempt(id)
    {
        warn!("Skipping source {id}: circuit open");
        return Vec::new();
    }

    let Ok(_permit) = pool.acquire_owned().await else {
        error!("Session pool closed, skipping source {id}");
        return Vec::new();
    };

    // Sources are expected to honour the budget themselves; this backstop
    // only cuts off one that does not.
    match tokio::time::timeout(budget + SESSION_CLOSE_GRACE, source.search_products(query)).await {
        Ok(Ok(products)) => {
            if let Some(breaker) = &breaker {
                breaker.record_success(id);
            }
            debug!("Source {id}: {} products", products.len());
            products
        }
        Ok(Err(e)) => {
            error!("Source {id} failed: {e}");
            if let Some(breaker) = &breaker {
                breaker.record_failure(id, &e.to_string());
            }
            Vec::new()
        }
        Err(_) => {
            warn!("Source {id} exceeded its {}s budget", budget.as_secs());
            if let Some(breaker) = &breaker {
                breaker.record_failure(id, "time budget exceeded");
            }
            Vec::new()
        }
    }
}

/// Whether two products are the same listing on the same source
///
/// When both sides carry a stable id the ids alone decide, since variants of
/// one listing page can share a path and differ only in the query. Otherwise
/// the canonical URLs (no query, no fragment) must be equal.
#[must_use]
pub fn same_listing(known: &Product, candidate: &Product) -> bool {
    if known.source_id != candidate.source_id {
        return false;
    }
    if known.site_product_id.is_stable() && candidate.site_product_id.is_stable() {
        return known.site_product_id == candidate.site_product_id;
    }
    canonicalize(&known.url) == canonicalize(&candidate.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{Amount, Currency};
    use crate::types::SiteProductId;

    fn product(source: &str, id: SiteProductId, url: &str) -> Product {
        Product {
            title: "Dell XPS 13 Laptop".into(),
            price: Amount::from_units(999),
            currency: Currency::Usd,
            url: url.into(),
            source_id: source.into(),
            site_product_id: id,
            image_url: None,
            rating: None,
            review_count: None,
            reviews: Vec::new(),
            scraped_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn stable_ids_match_across_urls() {
        let a = product("ebay", SiteProductId::Stable("123".into()), "https://www.ebay.com/itm/123?hash=a");
        let b = product("ebay", SiteProductId::Stable("123".into()), "https://www.ebay.com/itm/dell/123");
        assert!(same_listing(&a, &b));
    }

    #[test]
    fn canonical_url_matches_without_stable_ids() {
        let a = product("ebay", SiteProductId::Synthetic("syn-1".into()), "https://www.ebay.com/itm/1?ref=x");
        let b = product("ebay", SiteProductId::Synthetic("syn-1".into()), "https://www.ebay.com/itm/1#reviews");
        assert!(same_listing(&a, &b));
    }

    #[test]
    fn variants_sharing_a_page_are_different_listings() {
        let base = "https://www.flipkart.com/poco-x6/p/itm123";
        let blue = product(
            "flipkart",
            SiteProductId::Stable("MOBGHWFHECFVMDCX".into()),
            &format!("{base}?pid=MOBGHWFHECFVMDCX"),
        );
        let black = product(
            "flipkart",
            SiteProductId::Stable("MOBGHWFHUYWGB5F2".into()),
            &format!("{base}?pid=MOBGHWFHUYWGB5F2"),
        );
        assert!(!same_listing(&blue, &black));
    }

    #[test]
    fn synthetic_id_falls_back_to_url() {
        let known = product("ebay", SiteProductId::Synthetic("syn-9".into()), "https://www.ebay.com/itm/9");
        let fresh = product("ebay", SiteProductId::Stable("9".into()), "https://www.ebay.com/itm/9?hash=b");
        assert!(same_listing(&known, &fresh));
    }

    #[test]
    fn other_source_never_matches() {
        let a = product("ebay", SiteProductId::Stable("1".into()), "https://x.test/p/1");
        let b = product("walmart", SiteProductId::Stable("1".into()), "https://x.test/p/1");
        assert!(!same_listing(&a, &b));
    }
}
