//! Polish amount-in-words conversion (kwota słownie).
//!
//! Renders a PLN amount as `"<złote słownie> <forma> <grosze słownie>
//! <forma>"`, e.g. `1234.56` → `"jeden tysiąc dwieście trzydzieści cztery
//! złote pięćdziesiąt sześć groszy"`. Noun forms follow the three-way
//! Polish plural rule shared by tysiąc/milion and the currency units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::InvoiceError;
use super::money::round2;

static ONES: [&str; 20] = [
    "",
    "jeden",
    "dwa",
    "trzy",
    "cztery",
    "pięć",
    "sześć",
    "siedem",
    "osiem",
    "dziewięć",
    "dziesięć",
    "jedenaście",
    "dwanaście",
    "trzynaście",
    "czternaście",
    "piętnaście",
    "szesnaście",
    "siedemnaście",
    "osiemnaście",
    "dziewiętnaście",
];

static TENS: [&str; 10] = [
    "",
    "",
    "dwadzieścia",
    "trzydzieści",
    "czterdzieści",
    "pięćdziesiąt",
    "sześćdziesiąt",
    "siedemdziesiąt",
    "osiemdziesiąt",
    "dziewięćdziesiąt",
];

static HUNDREDS: [&str; 10] = [
    "",
    "sto",
    "dwieście",
    "trzysta",
    "czterysta",
    "pięćset",
    "sześćset",
    "siedemset",
    "osiemset",
    "dziewięćset",
];

/// The three grammatical forms a Polish counted noun takes.
struct PluralForms {
    /// Exactly 1 — "jeden złoty".
    one: &'static str,
    /// Last digit 2–4 outside 12–14 — "dwa złote".
    few: &'static str,
    /// Everything else, including 12–14 — "pięć złotych".
    many: &'static str,
}

static THOUSAND: PluralForms = PluralForms {
    one: "tysiąc",
    few: "tysiące",
    many: "tysięcy",
};

static MILLION: PluralForms = PluralForms {
    one: "milion",
    few: "miliony",
    many: "milionów",
};

static ZLOTY: PluralForms = PluralForms {
    one: "złoty",
    few: "złote",
    many: "złotych",
};

static GROSZ: PluralForms = PluralForms {
    one: "grosz",
    few: "grosze",
    many: "groszy",
};

/// Largest renderable integer part: the word tables group by
/// millions/thousands/hundreds, so anything at or above a billion złoty
/// has no words.
const MAX_INTEGER: u64 = 1_000_000_000;

/// Pick the grammatical form for `n` of the given noun.
fn plural_form(n: u64, forms: &'static PluralForms) -> &'static str {
    if n == 1 {
        return forms.one;
    }
    let last_two = n % 100;
    if (12..=14).contains(&last_two) {
        return forms.many;
    }
    match n % 10 {
        2..=4 => forms.few,
        _ => forms.many,
    }
}

/// Words for 1–999. Zero renders as the empty string so group rendering
/// can skip empty chunks.
fn under_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    if n == 0 {
        return String::new();
    }

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    let mut n = n;

    if n >= 100 {
        parts.push(HUNDREDS[(n / 100) as usize]);
        n %= 100;
    }
    if n >= 20 {
        parts.push(TENS[(n / 10) as usize]);
        if n % 10 > 0 {
            parts.push(ONES[(n % 10) as usize]);
        }
    } else if n > 0 {
        parts.push(ONES[n as usize]);
    }

    parts.join(" ")
}

/// Words for a non-negative integer below one billion.
fn integer_words(n: u64) -> String {
    debug_assert!(n < MAX_INTEGER);
    if n == 0 {
        return "zero".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut n = n;

    if n >= 1_000_000 {
        let millions = n / 1_000_000;
        parts.push(under_thousand(millions));
        parts.push(plural_form(millions, &MILLION).to_string());
        n %= 1_000_000;
    }

    if n >= 1000 {
        let thousands = n / 1000;
        // "tysiąc", never "jeden tysiąc" on its own group
        if thousands == 1 {
            parts.push(THOUSAND.one.to_string());
        } else {
            parts.push(under_thousand(thousands));
            parts.push(plural_form(thousands, &THOUSAND).to_string());
        }
        n %= 1000;
    }

    if n > 0 {
        parts.push(under_thousand(n));
    }

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Split a non-negative amount into (złote, grosze).
fn split_amount(amount: Decimal) -> Result<(u64, u64), InvoiceError> {
    if amount.is_sign_negative() {
        return Err(InvoiceError::InvalidAmount(format!(
            "amount {amount} is negative; words are only defined for non-negative amounts"
        )));
    }
    let amount = round2(amount);
    let integer = amount.trunc();
    let major = integer
        .to_u64()
        .filter(|&n| n < MAX_INTEGER)
        .ok_or_else(|| {
            InvoiceError::InvalidAmount(format!(
                "amount {amount} is too large to render in words"
            ))
        })?;
    let minor = ((amount - integer) * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);
    Ok((major, minor))
}

/// Spell out a PLN amount: `"piętnaście tysięcy złotych zero groszy"`.
///
/// The amount must be non-negative; fractional digits beyond the second
/// are rounded half-up into the grosz value.
pub fn amount_in_words(amount: Decimal) -> Result<String, InvoiceError> {
    let (major, minor) = split_amount(amount)?;

    let zloty_words = integer_words(major);
    let zloty_form = plural_form(major, &ZLOTY);
    let grosz_words = integer_words(minor);
    let grosz_form = plural_form(minor, &GROSZ);

    Ok(format!(
        "{zloty_words} {zloty_form} {grosz_words} {grosz_form}"
    ))
}

/// Shorter alternative used on compact documents:
/// `"piętnaście tysięcy PLN 00 gr"`.
pub fn amount_in_words_short(amount: Decimal) -> Result<String, InvoiceError> {
    let (major, minor) = split_amount(amount)?;
    Ok(format!("{} PLN {minor:02} gr", integer_words(major)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn one_zloty() {
        assert_eq!(
            amount_in_words(dec!(1.00)).unwrap(),
            "jeden złoty zero groszy"
        );
    }

    #[test]
    fn zero() {
        assert_eq!(
            amount_in_words(dec!(0)).unwrap(),
            "zero złotych zero groszy"
        );
    }

    #[test]
    fn fifteen_thousand() {
        assert_eq!(
            amount_in_words(dec!(15000.00)).unwrap(),
            "piętnaście tysięcy złotych zero groszy"
        );
    }

    #[test]
    fn mixed_thousands_and_cents() {
        assert_eq!(
            amount_in_words(dec!(1234.56)).unwrap(),
            "jeden tysiąc dwieście trzydzieści cztery złote pięćdziesiąt sześć groszy"
        );
    }

    #[test]
    fn few_form_on_last_digit_2_to_4() {
        assert_eq!(
            amount_in_words(dec!(2.02)).unwrap(),
            "dwa złote dwa grosze"
        );
        assert_eq!(
            amount_in_words(dec!(22)).unwrap(),
            "dwadzieścia dwa złote zero groszy"
        );
    }

    #[test]
    fn teens_always_take_many_form() {
        assert_eq!(
            amount_in_words(dec!(12.13)).unwrap(),
            "dwanaście złotych trzynaście groszy"
        );
        assert_eq!(
            amount_in_words(dec!(112)).unwrap(),
            "sto dwanaście złotych zero groszy"
        );
    }

    #[test]
    fn thousand_group_forms() {
        assert_eq!(integer_words(1000), "tysiąc");
        assert_eq!(integer_words(2000), "dwa tysiące");
        assert_eq!(integer_words(5000), "pięć tysięcy");
        assert_eq!(integer_words(12000), "dwanaście tysięcy");
        assert_eq!(integer_words(22000), "dwadzieścia dwa tysiące");
    }

    #[test]
    fn million_group_forms() {
        assert_eq!(integer_words(1_000_000), "jeden milion");
        assert_eq!(integer_words(2_000_000), "dwa miliony");
        assert_eq!(integer_words(5_000_000), "pięć milionów");
        assert_eq!(
            integer_words(999_999_999),
            "dziewięćset dziewięćdziesiąt dziewięć milionów \
             dziewięćset dziewięćdziesiąt dziewięć tysięcy \
             dziewięćset dziewięćdziesiąt dziewięć"
        );
    }

    #[test]
    fn sub_cent_digits_round_into_grosze() {
        assert_eq!(
            amount_in_words(dec!(1.005)).unwrap(),
            "jeden złoty jeden grosz"
        );
    }

    #[test]
    fn negative_rejected() {
        assert!(matches!(
            amount_in_words(dec!(-1)),
            Err(InvoiceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn billion_rejected() {
        assert!(matches!(
            amount_in_words(Decimal::from(MAX_INTEGER)),
            Err(InvoiceError::InvalidAmount(_))
        ));
        assert!(amount_in_words(Decimal::from(MAX_INTEGER - 1)).is_ok());
    }

    #[test]
    fn short_form() {
        assert_eq!(
            amount_in_words_short(dec!(15000.00)).unwrap(),
            "piętnaście tysięcy PLN 00 gr"
        );
        assert_eq!(
            amount_in_words_short(dec!(7.05)).unwrap(),
            "siedem PLN 05 gr"
        );
    }
}
