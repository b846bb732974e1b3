//! Price and currency normalization
//!
//! Turns storefront price text ("₹1,23,999", "1.234,56 €", "Free") into a
//! canonical `(amount, currency)` pair. Pure text processing, no I/O.
//!
//! The parser never fails: total failure yields zero in the default
//! currency and a warning.

mod amount;
mod currency;
mod numbers;

pub use amount::Amount;
pub use currency::{Currency, detect_currency};
pub use numbers::{parse_rating, parse_review_count};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::PRICE_SANITY_CEILING_UNITS;

/// An amount paired with its ISO currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalPrice {
    pub amount: Amount,
    pub currency: Currency,
}

impl CanonicalPrice {
    #[must_use]
    pub const fn new(amount: Amount, currency: Currency) -> Self {
        Self { amount, currency }
    }

    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Amount::ZERO, currency)
    }
}

static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+to\s+|\s*[-–—]\s*").expect("Invalid range separator regex"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid digit run regex"));

/// Parse storefront price text into a canonical price
///
/// Steps, in order: detect and strip the first currency marker, keep only the
/// lower bound of a range, strip everything but digits and separators,
/// disambiguate `.` / `,`, parse as fixed-point. If that fails the first digit
/// runs of the original text are used instead. Amounts above the sanity
/// ceiling are assumed to have lost their decimal point and are divided by 100.
#[must_use]
pub fn parse_price(text: &str, default_currency: Currency) -> CanonicalPrice {
    let (currency, remainder) = match detect_currency(text) {
        Some((currency, range)) => {
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..range.start]);
            stripped.push_str(&text[range.end..]);
            (currency, stripped)
        }
        None => (default_currency, text.to_string()),
    };

    let lower_bound = lower_bound_of_range(&remainder);
    let numeric: String = lower_bound
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let amount = match Amount::parse_decimal(&disambiguate_separators(&numeric)) {
        Some(amount) => amount,
        None => match digit_run_fallback(text) {
            Some(amount) => {
                debug!("Price '{}' parsed via digit-run fallback: {}", text, amount);
                amount
            }
            None if text.to_lowercase().contains("free") => Amount::ZERO,
            None => {
                warn!(
                    "Could not parse price from '{}', defaulting to 0 {}",
                    text, default_currency
                );
                return CanonicalPrice::zero(default_currency);
            }
        },
    };

    CanonicalPrice::new(apply_sanity_bound(amount, text), currency)
}

/// Keep the part before a range separator, if that part holds a number
fn lower_bound_of_range(text: &str) -> &str {
    if let Some(m) = RANGE_SEPARATOR.find(text) {
        let head = &text[..m.start()];
        let tail = &text[m.end()..];
        if head.chars().any(|c| c.is_ascii_digit()) && tail.chars().any(|c| c.is_ascii_digit()) {
            return head;
        }
    }
    text
}

/// Rewrite a digits-and-separators string into a plain `digits[.digits]` form
///
/// - Both separators present: the later one is the decimal point.
/// - Only `,`: decimal when it occurs once and 1-2 digits follow.
/// - Only `.`: decimal when it occurs once and 1-3 digits follow.
///
/// Any separator not chosen as the decimal point is a thousands separator
/// and is dropped.
fn disambiguate_separators(numeric: &str) -> String {
    let last_dot = numeric.rfind('.');
    let last_comma = numeric.rfind(',');

    let decimal_at = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (None, Some(comma)) => decimal_if_single(numeric, ',', comma, 2),
        (Some(dot), None) => decimal_if_single(numeric, '.', dot, 3),
        (None, None) => None,
    };

    numeric
        .char_indices()
        .filter_map(|(i, c)| match c {
            '.' | ',' if Some(i) == decimal_at => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect()
}

fn decimal_if_single(numeric: &str, sep: char, pos: usize, max_trailing: usize) -> Option<usize> {
    let trailing = numeric.len() - pos - 1;
    let single = numeric.matches(sep).count() == 1;
    (single && (1..=max_trailing).contains(&trailing)).then_some(pos)
}

/// First digit run as units; a second run of at most two digits as cents
fn digit_run_fallback(text: &str) -> Option<Amount> {
    let mut runs = DIGIT_RUN.find_iter(text).map(|m| m.as_str());
    let units = Amount::parse_decimal(runs.next()?)?;
    let cents = match runs.next() {
        // "12.5" means fifty cents, not five
        Some(run) if run.len() == 1 => run.parse::<i64>().map_or(0, |c| c * 10),
        Some(run) if run.len() == 2 => run.parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    Some(Amount::from_minor(units.minor() + cents))
}

fn apply_sanity_bound(amount: Amount, text: &str) -> Amount {
    if amount.exceeds_units(PRICE_SANITY_CEILING_UNITS) {
        let adjusted = amount.shifted_down();
        warn!(
            "Implausible price {} parsed from '{}', assuming missing decimal point: {}",
            amount, text, adjusted
        );
        adjusted
    } else {
        amount
    }
}
