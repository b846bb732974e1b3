//! Test doubles and fixtures shared by the integration tests
//!
//! `FakeSessionFactory` hands out scripted sessions: each navigation pops the
//! next `FakePage` from a shared queue, and every open/close is counted so
//! tests can check session accounting.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pricewatch_scraper::adapter::{ProductSource, SiteAdapter};
use pricewatch_scraper::config::ScraperConfig;
use pricewatch_scraper::extraction::SiteRuleset;
use pricewatch_scraper::session::{
    NavigateOptions, NavigationOutcome, RenderSession, SessionFactory, SessionState,
};
use pricewatch_scraper::{Amount, Currency, Product, ScrapeError, ScrapeResult, SiteProductId};

/// What the next navigation produces
#[derive(Debug, Clone)]
pub enum FakePage {
    /// Loads and always reads as this document
    Html(String),
    /// Loads; successive `content()` reads walk the list, the last one repeats
    Sequence(Vec<String>),
    /// Loads after the given (virtual) delay
    Slow(Duration, String),
    /// Both load strategies fail
    NavigationError,
    /// Navigation panics
    Panic,
}

#[derive(Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub navigations: AtomicUsize,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
}

pub struct FakeSessionFactory {
    pages: Arc<Mutex<VecDeque<FakePage>>>,
    pub counters: Arc<Counters>,
    fail_open: bool,
}

impl FakeSessionFactory {
    pub fn new(pages: impl IntoIterator<Item = FakePage>) -> Arc<Self> {
        Arc::new(Self {
            pages: Arc::new(Mutex::new(pages.into_iter().collect())),
            counters: Arc::new(Counters::default()),
            fail_open: false,
        })
    }

    /// A factory whose browser never launches
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            pages: Arc::new(Mutex::new(VecDeque::new())),
            counters: Arc::new(Counters::default()),
            fail_open: true,
        })
    }
}

#[async_trait]
impl SessionFactory for FakeSessionFactory {
    async fn open(&self) -> ScrapeResult<Box<dyn RenderSession>> {
        if self.fail_open {
            return Err(ScrapeError::Browser("no browser in tests".into()));
        }
        let n = self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            id: format!("fake-{n}"),
            state: SessionState::Ready,
            pages: Arc::clone(&self.pages),
            counters: Arc::clone(&self.counters),
            current: Vec::new(),
            reads: 0,
            url: None,
        }))
    }
}

pub struct FakeSession {
    id: String,
    state: SessionState,
    pages: Arc<Mutex<VecDeque<FakePage>>>,
    counters: Arc<Counters>,
    current: Vec<String>,
    reads: usize,
    url: Option<String>,
}

#[async_trait]
impl RenderSession for FakeSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn navigate(&mut self, url: &str, _options: &NavigateOptions) -> ScrapeResult<NavigationOutcome> {
        assert_eq!(self.state, SessionState::Ready, "navigate on a {} session", self.state);
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| FakePage::Html(empty_results_page()));

        let documents = match page {
            FakePage::Html(html) => vec![html],
            FakePage::Sequence(docs) => docs,
            FakePage::Slow(delay, html) => {
                tokio::time::sleep(delay).await;
                vec![html]
            }
            FakePage::NavigationError => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: "primary: timeout; fallback: timeout".into(),
                });
            }
            FakePage::Panic => panic!("scripted navigation panic"),
        };
        self.current = documents;
        self.reads = 0;
        self.url = Some(url.to_string());
        Ok(NavigationOutcome::Loaded)
    }

    async fn content(&mut self) -> ScrapeResult<String> {
        let last = self.current.len().saturating_sub(1);
        let html = self.current.get(self.reads.min(last)).cloned().unwrap_or_default();
        self.reads += 1;
        Ok(html)
    }

    async fn current_url(&mut self) -> Option<String> {
        self.url.clone()
    }

    async fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.state = SessionState::Closed;
    }
}

pub const TEST_RULESET: &str = r#"{
    "id": "teststore",
    "display_name": "Test Store",
    "base_url": "https://shop.test",
    "search_url_template": "https://shop.test/search?q={query}",
    "default_currency": "USD",
    "brand_keywords": ["acme"],
    "challenge_markers": ["are you a human"],
    "result_containers": ["li.result"],
    "sponsored": { "selectors": [".ad-badge"], "text_markers": ["sponsored"] },
    "listing": {
        "title": ["h2.name"],
        "price": [".price"],
        "url": [{ "css": "a.link", "attr": "href" }],
        "image": [{ "css": "img", "attr": "src" }],
        "rating": [".stars"],
        "review_count": [".reviews"],
        "stable_id": [{ "css": "", "attr": "data-sku" }]
    },
    "id_patterns": ["/p/(\\d+)"],
    "detail": {
        "title": ["h1"],
        "price": [".price"],
        "review_containers": [".review"],
        "review": {
            "title": [".review-title"],
            "body": [".review-body"],
            "rating": [".review-stars"],
            "date": [".review-date"]
        }
    }
}"#;

pub fn test_ruleset() -> SiteRuleset {
    SiteRuleset::from_json(TEST_RULESET).unwrap()
}

/// Ruleset for another storefront on the same markup
pub fn ruleset_named(id: &str) -> SiteRuleset {
    let mut ruleset = test_ruleset();
    ruleset.id = id.to_string();
    ruleset.display_name = id.to_uppercase();
    ruleset
}

/// Fast config: no real waits unless a test asks for them
pub fn test_config() -> ScraperConfig {
    ScraperConfig::builder()
        .intervention_timeout_secs(120)
        .intervention_poll_interval_ms(2_000)
        .retry_delay_ms(3_000)
        .max_results_per_source(20)
        .max_concurrent_sessions(4)
        .source_timeout_secs(300)
        .build()
        .unwrap()
}

pub fn adapter(factory: Arc<FakeSessionFactory>) -> SiteAdapter {
    adapter_for(&test_ruleset(), factory)
}

pub fn adapter_for(ruleset: &SiteRuleset, factory: Arc<FakeSessionFactory>) -> SiteAdapter {
    SiteAdapter::new(ruleset, factory, &test_config()).unwrap()
}

pub fn as_source(adapter: SiteAdapter) -> Arc<dyn ProductSource> {
    Arc::new(adapter)
}

/// One result element; `sku` becomes the stable id
pub fn result_item(sku: &str, title: &str, price: &str) -> String {
    format!(
        r#"<li class="result" data-sku="{sku}">
            <a class="link" href="/p/{sku}?ref=search"><h2 class="name">{title}</h2></a>
            <span class="price">{price}</span>
            <img src="/img/{sku}.jpg">
            <span class="stars">4.5 out of 5 stars</span>
            <span class="reviews">(1,204)</span>
        </li>"#
    )
}

pub fn results_page(items: &[String]) -> String {
    format!(
        "<html><head><title>Results</title></head><body><ul>{}</ul></body></html>",
        items.join("\n")
    )
}

pub fn laptop_results() -> String {
    results_page(&[
        result_item("101", "Dell XPS 13 Laptop", "$1,199.00"),
        result_item("102", "Acme Generic Sleeve", "$19.99"),
        result_item("103", "Dell Inspiron 15 Laptop", "$649.50"),
    ])
}

pub fn empty_results_page() -> String {
    results_page(&[])
}

pub fn challenge_page() -> String {
    "<html><body><h1>Robot Check</h1><p>Type the characters you see to prove you are not a robot. \
     Enter the captcha below.</p></body></html>"
        .to_string()
}

pub fn detail_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body><h1>{title}</h1><span class="price">{price}</span>
        <div class="review"><span class="review-title">Great</span><p class="review-body">Fast and light.</p>
        <span class="review-stars">5.0 out of 5</span><span class="review-date">2 March 2024</span></div>
        </body></html>"#
    )
}

pub fn product(source: &str, sku: &str, title: &str, units: i64) -> Product {
    Product {
        title: title.to_string(),
        price: Amount::from_units(units),
        currency: Currency::Usd,
        url: format!("https://shop.test/p/{sku}"),
        source_id: source.to_string(),
        site_product_id: SiteProductId::Stable(sku.to_string()),
        image_url: None,
        rating: None,
        review_count: None,
        reviews: Vec::new(),
        scraped_at: chrono::Utc::now(),
    }
}
