use pricewatch_scraper::normalizer::{Amount, Currency, parse_price, parse_rating, parse_review_count};
use proptest::prelude::*;

fn group_thousands(units: u64, sep: char) -> String {
    let digits = units.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

#[test]
fn storefront_formats() {
    let cases = [
        ("$1,234.56", Currency::Usd, Amount::from_minor(123_456), Currency::Usd),
        ("₹99,999", Currency::Inr, Amount::from_units(99_999), Currency::Inr),
        ("1.234,56", Currency::Eur, Amount::from_minor(123_456), Currency::Eur),
        ("Free", Currency::Usd, Amount::ZERO, Currency::Usd),
        ("Rs. 2,499", Currency::Usd, Amount::from_units(2_499), Currency::Inr),
        ("£7.50", Currency::Usd, Amount::from_minor(750), Currency::Gbp),
    ];
    for (text, default, amount, currency) in cases {
        let price = parse_price(text, default);
        assert_eq!((price.amount, price.currency), (amount, currency), "{text}");
    }
}

#[test]
fn implausible_amount_is_scaled_down() {
    let price = parse_price("150000000", Currency::Usd);
    assert_eq!(price.amount, Amount::from_units(1_500_000));
    assert_eq!(price.currency, Currency::Usd);
}

#[test]
fn listing_numbers() {
    assert_eq!(parse_rating("4.3 out of 5 stars"), Some(4.3));
    assert_eq!(parse_rating("7 stars"), None);
    assert_eq!(parse_review_count("12,345 ratings"), Some(12_345));
    assert_eq!(parse_review_count("no reviews yet"), None);
}

proptest! {
    #[test]
    fn never_panics_never_negative(text in ".{0,64}") {
        let price = parse_price(&text, Currency::Usd);
        prop_assert!(price.amount.minor() >= 0);
    }

    #[test]
    fn us_formatted_prices_parse_exactly(units in 0u64..1_000_000, cents in 0u64..100) {
        let text = format!("${}.{cents:02}", group_thousands(units, ','));
        let price = parse_price(&text, Currency::Inr);
        prop_assert_eq!(price.currency, Currency::Usd);
        prop_assert_eq!(price.amount, Amount::from_minor((units * 100 + cents) as i64));
    }

    #[test]
    fn european_formatted_prices_parse_exactly(units in 0u64..1_000_000, cents in 0u64..100) {
        let text = format!("{},{cents:02} €", group_thousands(units, '.'));
        let price = parse_price(&text, Currency::Usd);
        prop_assert_eq!(price.currency, Currency::Eur);
        prop_assert_eq!(price.amount, Amount::from_minor((units * 100 + cents) as i64));
    }

    #[test]
    fn unmarked_text_keeps_default_currency(units in 1u64..100_000) {
        let price = parse_price(&units.to_string(), Currency::Jpy);
        prop_assert_eq!(price.currency, Currency::Jpy);
        prop_assert_eq!(price.amount, Amount::from_units(units as i64));
    }
}
