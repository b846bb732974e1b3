//! Listing identity
//!
//! Preference order: an id read from the markup, then the first matching
//! URL pattern, then a synthetic id derived from the canonical URL. Synthetic
//! ids are deterministic but not guaranteed stable across storefront URL
//! changes, and are flagged as such.

use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

use crate::types::SiteProductId;
use crate::utils::canonicalize;

/// Longest id read from markup that is still accepted
const MAX_MARKUP_ID_LEN: usize = 64;

/// `syn-` followed by the xxh3 hash of the canonical URL
#[must_use]
pub fn synthetic_id(url: &str) -> String {
    format!("syn-{:016x}", xxh3_64(canonicalize(url).as_bytes()))
}

fn usable_markup_id(candidate: &str) -> Option<&str> {
    let candidate = candidate.trim();
    let ok = !candidate.is_empty()
        && candidate.len() <= MAX_MARKUP_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    ok.then_some(candidate)
}

#[must_use]
pub fn resolve_product_id(markup_id: Option<&str>, url: &str, patterns: &[Regex]) -> SiteProductId {
    if let Some(id) = markup_id.and_then(usable_markup_id) {
        return SiteProductId::Stable(id.to_string());
    }

    for pattern in patterns {
        if let Some(id) = pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
        {
            return SiteProductId::Stable(id.to_string());
        }
    }

    SiteProductId::Synthetic(synthetic_id(url))
}
