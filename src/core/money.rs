//! Exact fixed-point monetary arithmetic.
//!
//! All computation uses [`rust_decimal::Decimal`] — never floating point.
//! Intermediate products stay unrounded; stored values are rounded to
//! 2 decimal places with commercial (half-up) rounding, line by line,
//! before any summation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::InvoiceError;
use super::types::InvoiceTotals;

/// Computed monetary breakdown of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineValues {
    /// quantity × unit price, rounded to 2 decimal places.
    pub net: Decimal,
    /// net × rate / 100, rounded to 2 decimal places.
    pub vat: Decimal,
    /// net + VAT, rounded to 2 decimal places.
    pub gross: Decimal,
}

/// Parse a decimal amount from its exact string form.
///
/// Rejects malformed input and negative values with
/// [`InvoiceError::InvalidAmount`] — currency amounts are never negative in
/// this domain.
pub fn parse_amount(s: &str) -> Result<Decimal, InvoiceError> {
    let value: Decimal = s
        .trim()
        .parse()
        .map_err(|_| InvoiceError::InvalidAmount(format!("'{s}' is not a decimal number")))?;
    if value.is_sign_negative() {
        return Err(InvoiceError::InvalidAmount(format!(
            "'{s}' is negative"
        )));
    }
    Ok(value)
}

/// Round to 2 decimal places using half-up (commercial rounding).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded percentage: `value × rate / 100`.
pub fn percent_of(value: Decimal, rate_percent: u8) -> Decimal {
    value * Decimal::from(rate_percent) / dec!(100)
}

/// Compute net/VAT/gross for one line, each independently rounded.
///
/// Quantity must be positive and the VAT rate at most 100.
pub fn line_values(
    quantity: Decimal,
    unit_price_net: Decimal,
    vat_rate: u8,
) -> Result<LineValues, InvoiceError> {
    if quantity <= Decimal::ZERO {
        return Err(InvoiceError::InvalidAmount(format!(
            "quantity {quantity} must be positive"
        )));
    }
    if unit_price_net.is_sign_negative() {
        return Err(InvoiceError::InvalidAmount(format!(
            "unit price {unit_price_net} must not be negative"
        )));
    }
    if vat_rate > 100 {
        return Err(InvoiceError::InvalidAmount(format!(
            "VAT rate {vat_rate} exceeds 100%"
        )));
    }

    let net = round2(quantity * unit_price_net);
    let vat = round2(percent_of(net, vat_rate));
    let gross = round2(net + vat);
    Ok(LineValues { net, vat, gross })
}

/// Sum already-rounded line values into invoice totals.
pub fn sum_line_values<'a>(values: impl IntoIterator<Item = &'a LineValues>) -> InvoiceTotals {
    let mut totals = InvoiceTotals {
        net: Decimal::ZERO,
        vat: Decimal::ZERO,
        gross: Decimal::ZERO,
    };
    for v in values {
        totals.net += v.net;
        totals.vat += v.vat;
        totals.gross += v.gross;
    }
    totals
}

/// Format an amount the Polish way: space-grouped thousands, comma decimal
/// separator — `15000 → "15 000,00"`.
pub fn format_pln(amount: Decimal) -> String {
    let fixed = round2(amount).abs();
    let s = format!("{fixed:.2}");
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() && !fixed.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{dec_part}")
}
