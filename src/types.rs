//! Scrape result records shared by adapters, the orchestrator and callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalizer::{Amount, CanonicalPrice, Currency};

/// Adapter-extracted identifier of a listing
///
/// `Synthetic` ids are derived from the listing URL when no stable id could
/// be extracted. They are deterministic for a given canonical URL but the
/// storefront may serve the same listing under another URL, so a catalog
/// must not rely on them for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SiteProductId {
    Stable(String),
    Synthetic(String),
}

impl SiteProductId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stable(id) | Self::Synthetic(id) => id,
        }
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable(_))
    }
}

impl fmt::Display for SiteProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub title: Option<String>,
    pub text: String,
    /// 0-5
    pub rating: Option<f32>,
    /// Date as printed by the storefront
    pub date: Option<String>,
}

/// One normalized listing
///
/// Only constructed once title, a sane positive price and an absolute URL
/// have all been extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: Amount,
    pub currency: Currency,
    pub url: String,
    pub source_id: String,
    pub site_product_id: SiteProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    /// When the listing was rendered and extracted
    #[serde(default = "Utc::now")]
    pub scraped_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub fn canonical_price(&self) -> CanonicalPrice {
        CanonicalPrice::new(self.price, self.currency)
    }
}

/// Outcome of re-deriving the current price of a known product
///
/// Persisting the new price is the caller's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price_changed: bool,
    pub old_price: Amount,
    pub new_price: Amount,
    pub currency: Currency,
    /// The freshly scraped listing the new price came from
    pub product: Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_serializes_with_kind() {
        let id = SiteProductId::Synthetic("syn-00ff".into());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"kind":"synthetic","value":"syn-00ff"}"#);
        assert!(!id.is_stable());
        assert!(SiteProductId::Stable("B0C1".into()).is_stable());
    }

    #[test]
    fn product_without_timestamp_is_stamped_on_load() {
        let before = Utc::now();
        let product: Product = serde_json::from_str(
            r#"{
                "title": "Dell XPS 13",
                "price": "999.00",
                "currency": "USD",
                "url": "https://www.ebay.com/itm/123",
                "source_id": "ebay",
                "site_product_id": {"kind": "stable", "value": "123"}
            }"#,
        )
        .unwrap();
        assert!(product.scraped_at >= before);
        assert!(product.reviews.is_empty());
    }
}
