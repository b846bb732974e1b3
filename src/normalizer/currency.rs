//! ISO 4217 currencies and the ordered marker table used to detect them

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Inr,
    Eur,
    Gbp,
    Jpy,
    Aud,
    Cad,
}

impl Currency {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Inr => "INR",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Aud => "AUD",
            Self::Cad => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "INR" => Ok(Self::Inr),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "JPY" => Ok(Self::Jpy),
            "AUD" => Ok(Self::Aud),
            "CAD" => Ok(Self::Cad),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}

enum Marker {
    /// Literal symbol, matched anywhere
    Symbol(&'static str),
    /// Alphabetic token, matched only when not embedded in a word
    Code(&'static str),
}

// Order matters: compound symbols ("US$", "Rs.") must precede their prefixes.
const MARKERS: &[(Marker, Currency)] = &[
    (Marker::Symbol("US$"), Currency::Usd),
    (Marker::Symbol("CA$"), Currency::Cad),
    (Marker::Symbol("C$"), Currency::Cad),
    (Marker::Symbol("AU$"), Currency::Aud),
    (Marker::Symbol("A$"), Currency::Aud),
    (Marker::Symbol("₹"), Currency::Inr),
    (Marker::Code(r"rs\.?"), Currency::Inr),
    (Marker::Code("inr"), Currency::Inr),
    (Marker::Code("usd"), Currency::Usd),
    (Marker::Symbol("€"), Currency::Eur),
    (Marker::Code("eur"), Currency::Eur),
    (Marker::Symbol("£"), Currency::Gbp),
    (Marker::Code("gbp"), Currency::Gbp),
    (Marker::Symbol("¥"), Currency::Jpy),
    (Marker::Symbol("￥"), Currency::Jpy),
    (Marker::Code("jpy"), Currency::Jpy),
    (Marker::Code("aud"), Currency::Aud),
    (Marker::Code("cad"), Currency::Cad),
    (Marker::Symbol("$"), Currency::Usd),
];

static MARKER_TABLE: Lazy<Vec<(Regex, Currency)>> = Lazy::new(|| {
    MARKERS
        .iter()
        .filter_map(|(marker, currency)| {
            let pattern = match marker {
                Marker::Symbol(sym) => format!("({})", regex::escape(sym)),
                Marker::Code(code) => format!(r"(?i)\b({code})(?:[^a-z]|$)"),
            };
            // Patterns are static; a failure here is caught by the table test.
            Regex::new(&pattern).ok().map(|re| (re, *currency))
        })
        .collect()
});

/// Find the first currency marker in table order
///
/// Returns the currency and the byte range of the marker itself, so the
/// caller can strip it.
#[must_use]
pub fn detect_currency(text: &str) -> Option<(Currency, Range<usize>)> {
    MARKER_TABLE.iter().find_map(|(re, currency)| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| (*currency, m.range()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_marker_compiles() {
        assert_eq!(MARKER_TABLE.len(), MARKERS.len());
    }

    #[test]
    fn detects_symbols_and_codes() {
        assert_eq!(detect_currency("$1,234.56").map(|d| d.0), Some(Currency::Usd));
        assert_eq!(detect_currency("₹99,999").map(|d| d.0), Some(Currency::Inr));
        assert_eq!(detect_currency("Rs. 499").map(|d| d.0), Some(Currency::Inr));
        assert_eq!(detect_currency("Rs499").map(|d| d.0), Some(Currency::Inr));
        assert_eq!(detect_currency("1.234,56 €").map(|d| d.0), Some(Currency::Eur));
        assert_eq!(detect_currency("EUR 12").map(|d| d.0), Some(Currency::Eur));
        assert_eq!(detect_currency("£20").map(|d| d.0), Some(Currency::Gbp));
        assert_eq!(detect_currency("AU$ 89").map(|d| d.0), Some(Currency::Aud));
        assert_eq!(detect_currency("CA$ 89").map(|d| d.0), Some(Currency::Cad));
    }

    #[test]
    fn codes_inside_words_are_ignored() {
        assert_eq!(detect_currency("Offers 299"), None);
        assert_eq!(detect_currency("Europe 10"), None);
    }

    #[test]
    fn marker_range_covers_only_the_marker() {
        let (_, range) = detect_currency("Rs.1,299").unwrap();
        assert_eq!(&"Rs.1,299"[range], "Rs.");
        let (_, range) = detect_currency("US$ 5").unwrap();
        assert_eq!(&"US$ 5"[range], "US$");
    }

    #[test]
    fn codes_round_trip() {
        for c in [Currency::Usd, Currency::Inr, Currency::Eur, Currency::Gbp, Currency::Jpy] {
            assert_eq!(c.code().parse::<Currency>().unwrap(), c);
        }
        assert!("XYZ".parse::<Currency>().is_err());
        assert_eq!(serde_json::to_string(&Currency::Inr).unwrap(), "\"INR\"");
    }
}
