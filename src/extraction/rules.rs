//! Declarative per-site extraction rules
//!
//! A ruleset is plain data (JSON) describing where a storefront keeps each
//! field. It is compiled once, when an adapter is built; selectors and id
//! patterns that do not compile reject the whole ruleset.

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::normalizer::Currency;
use crate::utils::constants::DEFAULT_BRAND_KEYWORDS;

/// One step of a fallback-selector chain
///
/// An empty `css` addresses the scoped element itself. Without `attr` the
/// whitespace-collapsed text content is taken. In JSON a bare string is
/// shorthand for `{ "css": <string> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SelectorRuleRepr")]
pub struct SelectorRule {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorRuleRepr {
    Css(String),
    Full {
        #[serde(default)]
        css: String,
        #[serde(default)]
        attr: Option<String>,
    },
}

impl From<SelectorRuleRepr> for SelectorRule {
    fn from(repr: SelectorRuleRepr) -> Self {
        match repr {
            SelectorRuleRepr::Css(css) => Self { css, attr: None },
            SelectorRuleRepr::Full { css, attr } => Self { css, attr },
        }
    }
}

impl SelectorRule {
    pub fn text(css: impl Into<String>) -> Self {
        Self { css: css.into(), attr: None }
    }

    pub fn attr(css: impl Into<String>, attr: impl Into<String>) -> Self {
        Self { css: css.into(), attr: Some(attr.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SponsoredRules {
    /// Matching the container or any descendant marks it sponsored
    pub selectors: Vec<String>,
    /// Case-insensitive phrases searched in the container text
    pub text_markers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingRules {
    pub title: Vec<SelectorRule>,
    pub price: Vec<SelectorRule>,
    pub url: Vec<SelectorRule>,
    pub image: Vec<SelectorRule>,
    pub rating: Vec<SelectorRule>,
    pub review_count: Vec<SelectorRule>,
    pub stable_id: Vec<SelectorRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewRules {
    pub title: Vec<SelectorRule>,
    pub body: Vec<SelectorRule>,
    pub rating: Vec<SelectorRule>,
    pub date: Vec<SelectorRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailRules {
    pub title: Vec<SelectorRule>,
    pub price: Vec<SelectorRule>,
    pub image: Vec<SelectorRule>,
    pub rating: Vec<SelectorRule>,
    pub review_count: Vec<SelectorRule>,
    pub stable_id: Vec<SelectorRule>,
    pub review_containers: Vec<String>,
    pub review: ReviewRules,
}

/// Everything the generic adapter needs to know about one storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRuleset {
    pub id: String,
    pub display_name: String,
    pub base_url: String,
    /// Search page URL with a `{query}` placeholder
    pub search_url_template: String,
    pub default_currency: Currency,
    #[serde(default)]
    pub brand_keywords: Vec<String>,
    #[serde(default)]
    pub challenge_markers: Vec<String>,
    pub result_containers: Vec<String>,
    #[serde(default)]
    pub sponsored: SponsoredRules,
    pub listing: ListingRules,
    /// Regexes with one capture group, tried in order against listing URLs
    #[serde(default)]
    pub id_patterns: Vec<String>,
    #[serde(default)]
    pub detail: DetailRules,
}

impl SiteRuleset {
    pub fn from_json(json: &str) -> ScrapeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn compile(&self) -> ScrapeResult<CompiledRuleset> {
        let site = self.id.as_str();
        let invalid = |field: &str, reason: String| ScrapeError::InvalidRule {
            site: site.to_string(),
            field: field.to_string(),
            reason,
        };

        if site.trim().is_empty() {
            return Err(invalid("id", "must not be empty".to_string()));
        }
        let base_url = Url::parse(&self.base_url).map_err(|e| invalid("base_url", e.to_string()))?;
        if !self.search_url_template.contains("{query}") {
            return Err(invalid(
                "search_url_template",
                "missing {query} placeholder".to_string(),
            ));
        }
        if self.result_containers.is_empty() {
            return Err(invalid("result_containers", "at least one selector required".to_string()));
        }

        let selectors = |field: &str, list: &[String]| -> ScrapeResult<Vec<Selector>> {
            list.iter()
                .map(|css| compile_selector(css).map_err(|reason| invalid(field, reason)))
                .collect()
        };
        let chain = |field: &str, rules: &[SelectorRule]| -> ScrapeResult<FieldChain> {
            rules
                .iter()
                .map(|rule| -> ScrapeResult<CompiledRule> {
                    let selector = if rule.css.trim().is_empty() {
                        None
                    } else {
                        Some(compile_selector(&rule.css).map_err(|reason| invalid(field, reason))?)
                    };
                    Ok(CompiledRule { selector, attr: rule.attr.clone() })
                })
                .collect::<ScrapeResult<Vec<_>>>()
                .map(FieldChain)
        };

        let listing = &self.listing;
        for (field, rules) in [
            ("listing.title", &listing.title),
            ("listing.price", &listing.price),
            ("listing.url", &listing.url),
        ] {
            if rules.is_empty() {
                return Err(invalid(field, "required field has no rules".to_string()));
            }
        }

        let id_patterns = self
            .id_patterns
            .iter()
            .map(|pattern| -> ScrapeResult<Regex> {
                let regex = Regex::new(pattern).map_err(|e| invalid("id_patterns", e.to_string()))?;
                if regex.captures_len() < 2 {
                    return Err(invalid(
                        "id_patterns",
                        format!("pattern '{pattern}' has no capture group"),
                    ));
                }
                Ok(regex)
            })
            .collect::<ScrapeResult<Vec<_>>>()?;

        let mut brand_keywords: Vec<String> = DEFAULT_BRAND_KEYWORDS
            .iter()
            .map(|b| (*b).to_string())
            .chain(self.brand_keywords.iter().map(|b| b.trim().to_lowercase()))
            .filter(|b| !b.is_empty())
            .collect();
        brand_keywords.sort();
        brand_keywords.dedup();

        let detail = &self.detail;
        Ok(CompiledRuleset {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            base_url,
            search_url_template: self.search_url_template.clone(),
            default_currency: self.default_currency,
            brand_keywords,
            challenge_markers: self.challenge_markers.clone(),
            result_containers: selectors("result_containers", &self.result_containers)?,
            sponsored_selectors: selectors("sponsored.selectors", &self.sponsored.selectors)?,
            sponsored_markers: self
                .sponsored
                .text_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            listing: ListingChains {
                title: chain("listing.title", &listing.title)?,
                price: chain("listing.price", &listing.price)?,
                url: chain("listing.url", &listing.url)?,
                image: chain("listing.image", &listing.image)?,
                rating: chain("listing.rating", &listing.rating)?,
                review_count: chain("listing.review_count", &listing.review_count)?,
                stable_id: chain("listing.stable_id", &listing.stable_id)?,
            },
            id_patterns,
            detail: DetailChains {
                title: chain("detail.title", &detail.title)?,
                price: chain("detail.price", &detail.price)?,
                image: chain("detail.image", &detail.image)?,
                rating: chain("detail.rating", &detail.rating)?,
                review_count: chain("detail.review_count", &detail.review_count)?,
                stable_id: chain("detail.stable_id", &detail.stable_id)?,
                review_containers: selectors("detail.review_containers", &detail.review_containers)?,
                review: ReviewChains {
                    title: chain("detail.review.title", &detail.review.title)?,
                    body: chain("detail.review.body", &detail.review.body)?,
                    rating: chain("detail.review.rating", &detail.review.rating)?,
                    date: chain("detail.review.date", &detail.review.date)?,
                },
            },
        })
    }
}

fn compile_selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{css}': {e}"))
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// `None` addresses the scoped element itself
    pub(crate) selector: Option<Selector>,
    pub(crate) attr: Option<String>,
}

/// Ordered fallback chain for one field
#[derive(Debug, Clone, Default)]
pub struct FieldChain(pub(crate) Vec<CompiledRule>);

impl FieldChain {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ListingChains {
    pub title: FieldChain,
    pub price: FieldChain,
    pub url: FieldChain,
    pub image: FieldChain,
    pub rating: FieldChain,
    pub review_count: FieldChain,
    pub stable_id: FieldChain,
}

#[derive(Debug, Clone)]
pub struct ReviewChains {
    pub title: FieldChain,
    pub body: FieldChain,
    pub rating: FieldChain,
    pub date: FieldChain,
}

#[derive(Debug, Clone)]
pub struct DetailChains {
    pub title: FieldChain,
    pub price: FieldChain,
    pub image: FieldChain,
    pub rating: FieldChain,
    pub review_count: FieldChain,
    pub stable_id: FieldChain,
    pub review_containers: Vec<Selector>,
    pub review: ReviewChains,
}

/// A ruleset with every selector and pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRuleset {
    pub id: String,
    pub display_name: String,
    pub base_url: Url,
    pub search_url_template: String,
    pub default_currency: Currency,
    /// Built-in brands merged with the site's own, lowercased
    pub brand_keywords: Vec<String>,
    pub challenge_markers: Vec<String>,
    pub result_containers: Vec<Selector>,
    pub sponsored_selectors: Vec<Selector>,
    pub sponsored_markers: Vec<String>,
    pub listing: ListingChains,
    pub id_patterns: Vec<Regex>,
    pub detail: DetailChains,
}
