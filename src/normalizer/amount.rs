//! Fixed-point monetary amount
//!
//! Amounts are stored as signed hundredths of the currency unit. Storefront
//! prices never carry more than two meaningful decimals; a third decimal is
//! rounded half-up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest digit string accepted before a parse is considered garbage
const MAX_INTEGER_DIGITS: usize = 15;

/// Monetary amount in hundredths of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "AmountRepr")]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Hundredths of a unit
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Whole units, truncated
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0 / 100
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Strictly greater than `units` whole units
    #[must_use]
    pub const fn exceeds_units(self, units: i64) -> bool {
        self.0 > units.saturating_mul(100)
    }

    /// Divide by 100, used to undo a missing decimal point
    #[must_use]
    pub const fn shifted_down(self) -> Self {
        Self(self.0 / 100)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a plain decimal string: ASCII digits with at most one `.`
    ///
    /// Returns `None` for empty input, a lone separator, any other character,
    /// or integers longer than 15 digits.
    #[must_use]
    pub fn parse_decimal(s: &str) -> Option<Self> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if int_part.len() > MAX_INTEGER_DIGITS
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };

        let frac = frac_part.as_bytes();
        let digit = |i: usize| frac.get(i).map_or(0, |b| i64::from(b - b'0'));
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        units.checked_mul(100)?.checked_add(cents).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = String;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Text(s) => {
                let trimmed = s.trim();
                let (negative, digits) = match trimmed.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, trimmed),
                };
                let amount = Amount::parse_decimal(digits)
                    .ok_or_else(|| format!("invalid amount: {s}"))?;
                Ok(if negative { Amount(-amount.0) } else { amount })
            }
            #[allow(clippy::cast_possible_truncation)]
            AmountRepr::Number(n) if n.is_finite() => Ok(Amount((n * 100.0).round() as i64)),
            AmountRepr::Number(n) => Err(format!("invalid amount: {n}")),
        }
    }
}
