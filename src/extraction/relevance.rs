//! Query/title relevance filter
//!
//! Storefront search pages pad results with accessories and loosely related
//! items. A listing is kept when:
//! - the query names a known brand and the title contains one of those brands, or
//! - otherwise, the title shares at least one significant token with the query
//!   (two for queries of four or more significant tokens).

use crate::utils::constants::{LONG_QUERY_TOKENS, MIN_TOKEN_LEN, QUERY_STOPWORDS};

/// Lowercased alphanumeric words of `text`
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Significant tokens: lowercased, at least `MIN_TOKEN_LEN` chars, stopwords removed
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for word in words(text) {
        if word.chars().count() >= MIN_TOKEN_LEN
            && !QUERY_STOPWORDS.contains(&word.as_str())
            && !tokens.contains(&word)
        {
            tokens.push(word);
        }
    }
    tokens
}

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    query_tokens: Vec<String>,
    query_brands: Vec<String>,
    min_overlap: usize,
}

impl RelevanceFilter {
    /// `brand_keywords` must be lowercase
    pub fn new(query: &str, brand_keywords: &[String]) -> Self {
        let query_tokens = tokenize(query);

        let mut query_brands: Vec<String> = Vec::new();
        for word in words(query) {
            if brand_keywords.contains(&word) && !query_brands.contains(&word) {
                query_brands.push(word);
            }
        }

        let min_overlap = if query_tokens.len() >= LONG_QUERY_TOKENS { 2 } else { 1 };

        Self { query_tokens, query_brands, min_overlap }
    }

    #[must_use]
    pub fn accepts(&self, title: &str) -> bool {
        if !self.query_brands.is_empty() {
            return words(title).any(|w| self.query_brands.contains(&w));
        }
        if self.query_tokens.is_empty() {
            return true;
        }

        let title_tokens = tokenize(title);
        let overlap = self
            .query_tokens
            .iter()
            .filter(|t| title_tokens.contains(t))
            .count();
        overlap >= self.min_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> Vec<String> {
        ["dell", "hp", "apple"].iter().map(|b| (*b).to_string()).collect()
    }

    #[test]
    fn brand_query_requires_brand_in_title() {
        let filter = RelevanceFilter::new("dell laptop", &brands());
        assert!(filter.accepts("Dell XPS 13 Laptop"));
        assert!(!filter.accepts("Acme Generic Sleeve"));
        assert!(!filter.accepts("Laptop sleeve compatible with many models"));
    }

    #[test]
    fn short_brands_are_recognized() {
        let filter = RelevanceFilter::new("hp printer", &brands());
        assert!(filter.accepts("HP DeskJet 2331 Printer"));
        assert!(!filter.accepts("Canon PIXMA Printer"));
    }

    #[test]
    fn unbranded_short_query_needs_one_token() {
        let filter = RelevanceFilter::new("wireless mouse", &brands());
        assert!(filter.accepts("Logi Wireless Mouse M185"));
        assert!(filter.accepts("Ergonomic Mouse"));
        assert!(!filter.accepts("USB Keyboard"));
    }

    #[test]
    fn long_query_needs_two_tokens() {
        let filter = RelevanceFilter::new("noise cancelling wireless over ear headphones", &brands());
        assert!(filter.accepts("Wireless Headphones with Mic"));
        assert!(!filter.accepts("Wireless Charger Pad"));
    }

    #[test]
    fn tokenize_drops_short_words_and_stopwords() {
        assert_eq!(tokenize("The best 4K TV for gaming"), vec!["gaming".to_string()]);
        assert_eq!(tokenize("USB-C cable, USB"), vec!["usb".to_string(), "cable".to_string()]);
    }

    #[test]
    fn query_without_significant_tokens_accepts_everything() {
        let filter = RelevanceFilter::new("tv", &brands());
        assert!(filter.accepts("Anything at all"));
    }
}
