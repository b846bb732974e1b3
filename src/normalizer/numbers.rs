//! Rating and review-count parsing

use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("Invalid decimal regex"));

static COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,.]*)\s*([kK])?").expect("Invalid count regex"));

/// First decimal number in the text, accepted only within 0..=5
///
/// "4.3 out of 5 stars" -> 4.3, "Rated 4,5" -> 4.5
#[must_use]
pub fn parse_rating(text: &str) -> Option<f32> {
    let m = DECIMAL.find(text)?;
    let value: f32 = m.as_str().replace(',', ".").parse().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

/// First count in the text, tolerating thousands separators and a `k` suffix
///
/// "(1,234)" -> 1234, "12,345 ratings" -> 12345, "2.1K reviews" -> 2100
#[must_use]
pub fn parse_review_count(text: &str) -> Option<u32> {
    let caps = COUNT.captures(text)?;
    let raw = caps.get(1)?.as_str().trim_end_matches(['.', ',']);
    if caps.get(2).is_some() {
        let value: f64 = raw.replace(',', ".").parse().ok()?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (value * 1000.0).round() as u32;
        return Some(count);
    }
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
