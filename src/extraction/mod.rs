//! Generic extraction engine
//!
//! Site knowledge lives entirely in [`SiteRuleset`] data; this module only
//! knows how to walk fallback-selector chains, normalize what it finds and
//! filter it.

pub mod engine;
pub mod identity;
pub mod relevance;
pub mod rules;

pub use engine::{extract_detail, extract_listings};
pub use identity::{resolve_product_id, synthetic_id};
pub use relevance::{RelevanceFilter, tokenize};
pub use rules::{CompiledRuleset, SelectorRule, SiteRuleset};
