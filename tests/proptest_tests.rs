//! Property-based tests for the pure core: money arithmetic, the Polish
//! amount-in-words formatter, the calendar rule, and numbering.

use chrono::{Datelike, Weekday};
use fakturomat::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Amounts with at most 2 fractional digits, generated as grosz counts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|grosze| Decimal::new(grosze, 2))
}

proptest! {
    // --- Money ---

    #[test]
    fn gross_is_exactly_net_plus_vat(
        quantity_cents in 1i64..100_000,
        price_cents in 0i64..10_000_000,
        vat_rate in 0u8..=100,
    ) {
        let quantity = Decimal::new(quantity_cents, 2);
        let price = Decimal::new(price_cents, 2);
        let v = line_values(quantity, price, vat_rate).unwrap();

        // Components are already rounded to 2 dp, so their sum is exact.
        prop_assert_eq!(v.gross, v.net + v.vat);
        prop_assert_eq!(v.net, round2(v.net));
        prop_assert_eq!(v.vat, round2(v.vat));
        prop_assert!(v.vat <= v.net);
    }

    #[test]
    fn totals_scale_linearly_with_repeated_lines(
        price_cents in 0i64..10_000_000,
        vat_rate in 0u8..=100,
        copies in 1usize..20,
    ) {
        let v = line_values(dec!(1), Decimal::new(price_cents, 2), vat_rate).unwrap();
        let lines: Vec<_> = std::iter::repeat_n(v, copies).collect();
        let totals = sum_line_values(&lines);

        let n = Decimal::from(copies as u64);
        prop_assert_eq!(totals.net, v.net * n);
        prop_assert_eq!(totals.vat, v.vat * n);
        prop_assert_eq!(totals.gross, v.gross * n);
        prop_assert_eq!(totals.gross, totals.net + totals.vat);
    }

    #[test]
    fn round2_moves_at_most_half_a_grosz(cents_milli in 0i64..10_000_000) {
        // Inputs with 3 fractional digits.
        let value = Decimal::new(cents_milli, 3);
        let rounded = round2(value);
        let diff = (rounded - value).abs();
        prop_assert!(diff <= dec!(0.005));
        prop_assert_eq!(rounded, round2(rounded));
    }

    // --- Amount in words ---

    #[test]
    fn words_are_always_well_formed(amount in amount_strategy()) {
        let words = amount_in_words(amount).unwrap();

        prop_assert!(!words.is_empty());
        prop_assert!(!words.contains("  "), "double space in '{words}'");
        prop_assert!(!words.starts_with(' ') && !words.ends_with(' '));

        // One złoty form and one grosz form, per the plural rule.
        let major = amount.trunc().to_u64().unwrap();
        let minor = ((amount - amount.trunc()) * Decimal::ONE_HUNDRED)
            .to_u64()
            .unwrap();
        let zloty = expected_form(major, ["złoty", "złote", "złotych"]);
        let grosz = expected_form(minor, ["grosz", "grosze", "groszy"]);
        prop_assert!(
            words.contains(&format!(" {zloty} ")),
            "'{words}' lacks ' {zloty} '"
        );
        prop_assert!(words.ends_with(grosz), "'{words}' does not end with '{grosz}'");
    }

    #[test]
    fn short_form_always_names_the_currency(amount in amount_strategy()) {
        let words = amount_in_words_short(amount).unwrap();
        prop_assert!(words.contains(" PLN "));
        prop_assert!(words.ends_with(" gr"));
    }

    // --- Calendar ---

    #[test]
    fn trigger_day_is_a_weekday_near_month_end(year in 1970i32..=2100, month in 1u32..=12) {
        let p = Period::new(year, month).unwrap();
        let business = last_business_day(p);
        let calendar = last_calendar_day(p);

        prop_assert!(business <= calendar);
        prop_assert!(!matches!(business.weekday(), Weekday::Sat | Weekday::Sun));
        prop_assert!(calendar.signed_duration_since(business).num_days() <= 2);
        prop_assert_eq!(business.month(), month);
        prop_assert!(is_last_business_day(business));
    }

    // --- Numbering ---

    #[test]
    fn numbers_roundtrip_through_their_format(
        sequence in 1u32..1_000_000,
        month in 1u32..=12,
        year in 1i32..=9999,
    ) {
        let number = InvoiceNumber { sequence, month, year };
        let parsed: InvoiceNumber = number.to_string().parse().unwrap();
        prop_assert_eq!(parsed, number);
    }

    #[test]
    fn successor_increments_the_leading_segment(
        sequence in 1u32..1_000_000,
        month in 1u32..=12,
    ) {
        let p = Period::new(2025, month).unwrap();
        let last = InvoiceNumber { sequence, month, year: 2025 };
        let next = next_number(Some(&last.to_string()), p).unwrap();
        prop_assert_eq!(next.sequence, sequence + 1);
        prop_assert_eq!(next.month, month);
        prop_assert_eq!(next.year, 2025);
    }
}

/// The three-way Polish plural rule, restated independently of the
/// implementation under test.
fn expected_form(n: u64, forms: [&'static str; 3]) -> &'static str {
    if n == 1 {
        return forms[0];
    }
    let last_two = n % 100;
    if (12..=14).contains(&last_two) {
        return forms[2];
    }
    match n % 10 {
        2..=4 => forms[1],
        _ => forms[2],
    }
}
