//! Sequential invoice numbers, formatted `{sequence}/{MM}/{YYYY}`.
//!
//! Numbering is owner-scoped and year-scoped: the sequence runs across all
//! templates and months within a calendar year and restarts at 1 each new
//! year. The successor is always derived from the owner's most recently
//! created invoice of the year — nothing is reserved ahead of time, so a
//! failed materialization cannot burn a number.

use std::str::FromStr;

use super::error::InvoiceError;
use super::types::Period;

/// A parsed invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceNumber {
    /// Position within the owner's year, starting at 1.
    pub sequence: u32,
    /// Month the invoice was issued for.
    pub month: u32,
    /// Year the sequence is scoped to.
    pub year: i32,
}

impl InvoiceNumber {
    /// First number of a period's year.
    pub fn first(period: Period) -> Self {
        Self {
            sequence: 1,
            month: period.month(),
            year: period.year(),
        }
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}/{}", self.sequence, self.month, self.year)
    }
}

impl FromStr for InvoiceNumber {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InvoiceError::Numbering(format!("'{s}' is not a valid invoice number"));

        let mut parts = s.split('/');
        let sequence = parts.next().ok_or_else(bad)?;
        let month = parts.next().ok_or_else(bad)?;
        let year = parts.next().ok_or_else(bad)?;
        if parts.next().is_some() {
            return Err(bad());
        }

        let sequence: u32 = sequence.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        if sequence == 0 || !(1..=12).contains(&month) {
            return Err(bad());
        }
        Ok(Self {
            sequence,
            month,
            year,
        })
    }
}

/// Compute the next number for an owner in a period.
///
/// `last_in_year` is the number of the owner's most recently created
/// invoice within the period's year, or `None` when the year has no
/// invoices yet. The new sequence is the last one's leading segment plus
/// one. A stored number whose leading segment does not parse is a hard
/// error — silently restarting at 1 could mint a duplicate.
pub fn next_number(
    last_in_year: Option<&str>,
    period: Period,
) -> Result<InvoiceNumber, InvoiceError> {
    let Some(last) = last_in_year else {
        return Ok(InvoiceNumber::first(period));
    };

    let leading = last.split('/').next().unwrap_or(last);
    let sequence: u32 = leading.parse().map_err(|_| {
        InvoiceError::Numbering(format!(
            "stored invoice number '{last}' has no parseable sequence segment"
        ))
    })?;
    Ok(InvoiceNumber {
        sequence: sequence + 1,
        month: period.month(),
        year: period.year(),
    })
}
