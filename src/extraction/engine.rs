//! Rule-driven extraction over rendered HTML

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::identity::resolve_product_id;
use super::rules::{CompiledRuleset, FieldChain, ReviewChains};
use crate::normalizer::{CanonicalPrice, parse_price, parse_rating, parse_review_count};
use crate::types::{Product, Review};
use crate::utils::absolutize;
use crate::utils::constants::PRICE_SANITY_CEILING_UNITS;

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_value(element: ElementRef<'_>, attr: Option<&str>) -> Option<String> {
    let value = match attr {
        Some(name) => element.value().attr(name).map(str::trim).map(str::to_string),
        None => Some(collapse_whitespace(&element.text().collect::<String>())),
    };
    value.filter(|v| !v.is_empty())
}

impl FieldChain {
    /// First non-empty value produced by the chain within `scope`
    #[must_use]
    pub fn first_match(&self, scope: ElementRef<'_>) -> Option<String> {
        self.0.iter().find_map(|rule| match &rule.selector {
            None => element_value(scope, rule.attr.as_deref()),
            Some(selector) => scope
                .select(selector)
                .find_map(|el| element_value(el, rule.attr.as_deref())),
        })
    }
}

/// Elements of the first selector in the chain that matches anything
fn first_matching<'a>(scope: ElementRef<'a>, chain: &[Selector]) -> Vec<ElementRef<'a>> {
    chain
        .iter()
        .map(|selector| scope.select(selector).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

fn is_sponsored(ruleset: &CompiledRuleset, container: ElementRef<'_>) -> bool {
    let by_selector = ruleset
        .sponsored_selectors
        .iter()
        .any(|s| s.matches(&container) || container.select(s).next().is_some());
    if by_selector {
        return true;
    }
    if ruleset.sponsored_markers.is_empty() {
        return false;
    }
    let text = container.text().collect::<String>().to_lowercase();
    ruleset.sponsored_markers.iter().any(|m| text.contains(m.as_str()))
}

/// Normalize price text, rejecting non-positive and implausible amounts
fn sane_price(text: &str, ruleset: &CompiledRuleset) -> Option<CanonicalPrice> {
    let price = parse_price(text, ruleset.default_currency);
    if !price.amount.is_positive() || price.amount.exceeds_units(PRICE_SANITY_CEILING_UNITS) {
        trace!("Rejecting price '{}' -> {}", text, price.amount);
        return None;
    }
    Some(price)
}

/// Extract normalized listings from a search results page
///
/// At most `limit` result elements are inspected. Elements missing a title,
/// price or URL, or with an unusable price, are dropped. Page order is kept;
/// a listing repeated on the page is kept once.
#[must_use]
pub fn extract_listings(ruleset: &CompiledRuleset, html: &str, limit: usize) -> Vec<Product> {
    let document = Html::parse_document(html);
    let containers = first_matching(document.root_element(), &ruleset.result_containers);
    let chains = &ruleset.listing;

    let mut seen = HashSet::new();
    let mut products = Vec::new();
    let mut dropped = 0usize;
    let scraped_at = Utc::now();

    for container in containers.into_iter().take(limit) {
        if is_sponsored(ruleset, container) {
            trace!("Skipping sponsored result");
            continue;
        }

        let (Some(title), Some(price_text), Some(href)) = (
            chains.title.first_match(container),
            chains.price.first_match(container),
            chains.url.first_match(container),
        ) else {
            dropped += 1;
            continue;
        };
        let Some(url) = absolutize(&ruleset.base_url, &href) else {
            dropped += 1;
            continue;
        };
        let Some(price) = sane_price(&price_text, ruleset) else {
            dropped += 1;
            continue;
        };

        let markup_id = chains.stable_id.first_match(container);
        let site_product_id = resolve_product_id(markup_id.as_deref(), &url, &ruleset.id_patterns);
        if !seen.insert(site_product_id.clone()) {
            continue;
        }

        products.push(Product {
            title,
            price: price.amount,
            currency: price.currency,
            image_url: chains
                .image
                .first_match(container)
                .and_then(|src| absolutize(&ruleset.base_url, &src)),
            rating: chains.rating.first_match(container).as_deref().and_then(parse_rating),
            review_count: chains
                .review_count
                .first_match(container)
                .as_deref()
                .and_then(parse_review_count),
            source_id: ruleset.id.clone(),
            site_product_id,
            url,
            reviews: Vec::new(),
            scraped_at,
        });
    }

    debug!(
        "{}: extracted {} listings ({} incomplete dropped)",
        ruleset.id,
        products.len(),
        dropped
    );
    products
}

fn extract_review(chains: &ReviewChains, container: ElementRef<'_>) -> Option<Review> {
    let text = chains.body.first_match(container)?;
    Some(Review {
        title: chains.title.first_match(container),
        text,
        rating: chains.rating.first_match(container).as_deref().and_then(parse_rating),
        date: chains.date.first_match(container),
    })
}

/// Extract a single listing page, including up to `max_reviews` reviews
///
/// `page_url` is the listing URL that was requested; it becomes the
/// product URL. Returns `None` when title or a usable price is missing.
#[must_use]
pub fn extract_detail(
    ruleset: &CompiledRuleset,
    html: &str,
    page_url: &str,
    max_reviews: usize,
) -> Option<Product> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let chains = &ruleset.detail;

    let title = chains.title.first_match(root)?;
    let price = chains
        .price
        .first_match(root)
        .and_then(|text| sane_price(&text, ruleset))?;

    let reviews = first_matching(root, &chains.review_containers)
        .into_iter()
        .filter_map(|container| extract_review(&chains.review, container))
        .take(max_reviews)
        .collect();

    let markup_id = chains.stable_id.first_match(root);
    Some(Product {
        title,
        price: price.amount,
        currency: price.currency,
        url: page_url.to_string(),
        source_id: ruleset.id.clone(),
        site_product_id: resolve_product_id(markup_id.as_deref(), page_url, &ruleset.id_patterns),
        image_url: chains
            .image
            .first_match(root)
            .and_then(|src| absolutize(&ruleset.base_url, &src)),
        rating: chains.rating.first_match(root).as_deref().and_then(parse_rating),
        review_count: chains
            .review_count
            .first_match(root)
            .as_deref()
            .and_then(parse_review_count),
        reviews,
        scraped_at: Utc::now(),
    })
}
