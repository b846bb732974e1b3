//! Generic ruleset-driven site adapter

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use super::ProductSource;
use crate::antibot::{ChallengeDetector, InterventionPolicy, await_intervention};
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::extraction::{CompiledRuleset, RelevanceFilter, SiteRuleset, extract_detail, extract_listings};
use crate::session::{NavigateOptions, NavigationOutcome, RenderSession, SessionFactory};
use crate::types::Product;
use crate::utils::{build_search_url, is_valid_url};

/// First attempt plus the single retry after an empty extraction
const SEARCH_ATTEMPTS: u32 = 2;

/// One storefront, described entirely by its compiled ruleset
///
/// Each call opens its own session and closes it before returning, so one
/// adapter can serve concurrent calls without sharing a browser.
pub struct SiteAdapter {
    rules: Arc<CompiledRuleset>,
    sessions: Arc<dyn SessionFactory>,
    detector: ChallengeDetector,
    navigate: NavigateOptions,
    intervention: InterventionPolicy,
    retry_delay: Duration,
    budget: Duration,
    max_results: usize,
    max_reviews: usize,
}

impl std::fmt::Debug for SiteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteAdapter")
            .field("source", &self.rules.id)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl SiteAdapter {
    /// Compile `ruleset` and bind it to a session factory
    ///
    /// # Errors
    /// `ScrapeError::InvalidRule` if any selector or id pattern fails to compile.
    pub fn new(
        ruleset: &SiteRuleset,
        sessions: Arc<dyn SessionFactory>,
        config: &ScraperConfig,
    ) -> ScrapeResult<Self> {
        let rules = ruleset.compile()?;
        Ok(Self {
            detector: ChallengeDetector::new(&rules.challenge_markers),
            rules: Arc::new(rules),
            sessions,
            navigate: NavigateOptions::from_config(config),
            intervention: InterventionPolicy::from_config(config),
            retry_delay: config.retry_delay(),
            budget: config.source_timeout(),
            max_results: config.max_results_per_source(),
            max_reviews: config.max_reviews(),
        })
    }

    #[must_use]
    pub fn rules(&self) -> &CompiledRuleset {
        &self.rules
    }

    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        build_search_url(&self.rules.search_url_template, query)
    }

    fn budget_exceeded(&self) -> ScrapeError {
        ScrapeError::BudgetExceeded {
            site: self.rules.id.clone(),
            secs: self.budget.as_secs(),
        }
    }

    /// Navigate and clear the anti-bot gate
    ///
    /// `Ok(None)` means the page stayed challenged past the intervention window.
    async fn render(&self, session: &mut dyn RenderSession, url: &str) -> ScrapeResult<Option<String>> {
        let outcome = session.navigate(url, &self.navigate).await?;
        if outcome != NavigationOutcome::Loaded {
            debug!("{}: {url} rendered via {outcome:?}", self.rules.id);
        }
        let checked = await_intervention(session, &self.detector, &self.intervention).await?;
        Ok(checked.into_document())
    }

    async fn search_in(
        &self,
        session: &mut dyn RenderSession,
        url: &str,
        filter: &RelevanceFilter,
    ) -> ScrapeResult<Vec<Product>> {
        for attempt in 1..=SEARCH_ATTEMPTS {
            let Some(html) = self.render(session, url).await? else {
                warn!("{}: search blocked by anti-bot challenge", self.rules.id);
                return Ok(Vec::new());
            };

            let listings = extract_listings(&self.rules, &html, self.max_results);
            let extracted = listings.len();
            let products: Vec<Product> = listings
                .into_iter()
                .filter(|product| filter.accepts(&product.title))
                .collect();
            debug!(
                "{}: attempt {attempt}: {} of {extracted} listings relevant",
                self.rules.id,
                products.len()
            );

            if !products.is_empty() {
                return Ok(products);
            }
            if attempt < SEARCH_ATTEMPTS {
                info!(
                    "{}: no products extracted, retrying in {}ms",
                    self.rules.id,
                    self.retry_delay.as_millis()
                );
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        Ok(Vec::new())
    }

    async fn details_in(&self, session: &mut dyn RenderSession, url: &str) -> ScrapeResult<Option<Product>> {
        let Some(html) = self.render(session, url).await? else {
            warn!("{}: listing page blocked by anti-bot challenge: {url}", self.rules.id);
            return Ok(None);
        };
        let product = extract_detail(&self.rules, &html, url, self.max_reviews);
        if product.is_none() {
            warn!("{}: nothing extractable at {url}", self.rules.id);
        }
        Ok(product)
    }
}

/// Close `session`, then hand back the work's result or resume its panic
async fn release<T>(mut session: Box<dyn RenderSession>, outcome: std::thread::Result<T>) -> T {
    session.close().await;
    match outcome {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[async_trait]
impl ProductSource for SiteAdapter {
    fn source_id(&self) -> &str {
        &self.rules.id
    }

    fn display_name(&self) -> &str {
        &self.rules.display_name
    }

    async fn search_products(&self, query: &str) -> ScrapeResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.search_url(query);
        let filter = RelevanceFilter::new(query, &self.rules.brand_keywords);

        // The deadline covers launch and every attempt, and expiry still
        // goes through `release`.
        let deadline = Instant::now() + self.budget;
        let result = match timeout_at(deadline, self.sessions.open()).await {
            Ok(Ok(mut session)) => {
                let work = timeout_at(deadline, self.search_in(session.as_mut(), &url, &filter));
                let outcome = AssertUnwindSafe(work).catch_unwind().await;
                release(session, outcome)
                    .await
                    .unwrap_or_else(|_| Err(self.budget_exceeded()))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(self.budget_exceeded()),
        };

        match result {
            Ok(products) => {
                info!("{}: {} products for '{query}'", self.rules.id, products.len());
                Ok(products)
            }
            Err(e) if e.is_soft() => {
                warn!("{}: search for '{query}' failed: {e}", self.rules.id);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn get_product_details(&self, url: &str) -> ScrapeResult<Option<Product>> {
        if !is_valid_url(url) {
            return Err(ScrapeError::navigation(url, "not an absolute http(s) URL"));
        }
        let mut session = self.sessions.open().await?;
        let outcome = AssertUnwindSafe(self.details_in(session.as_mut(), url))
            .catch_unwind()
            .await;
        release(session, outcome).await
    }
}
