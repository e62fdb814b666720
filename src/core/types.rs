use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency every materialized invoice is denominated in.
pub const CURRENCY_PLN: &str = "PLN";

/// Payment term applied when a template does not specify one.
pub const DEFAULT_PAYMENT_DAYS: u32 = 14;

/// VAT rate applied when a template line item does not specify one.
pub const DEFAULT_VAT_RATE: u8 = 23;

/// A (month, year) pair identifying which recurring cycle an invoice
/// belongs to — distinct from the wall-clock creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period. Month must be 1–12, year 1–9999.
    pub fn new(year: i32, month: u32) -> Result<Self, super::error::InvoiceError> {
        if !(1..=12).contains(&month) {
            return Err(super::error::InvoiceError::Validation(format!(
                "month {month} is out of range 1-12"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(super::error::InvoiceError::Validation(format!(
                "year {year} is out of range 1-9999"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period a given date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        // Month and year ranges are checked in `new`/`from_date`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| unreachable!("period holds a validated month/year"))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Invoice lifecycle. Transitions only move forward: `Issued` is the
/// initial state; email delivery moves it to `Sent` or `Failed`; retried
/// sends re-attempt from `Sent`/`Failed` but never return to `Issued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Created and persisted; no delivery attempted yet.
    Issued,
    /// Last email delivery attempt succeeded.
    Sent,
    /// Last email delivery attempt failed.
    Failed,
}

impl InvoiceStatus {
    /// Whether a status change to `to` is allowed.
    pub fn can_transition(self, to: InvoiceStatus) -> bool {
        match to {
            InvoiceStatus::Issued => self == InvoiceStatus::Issued,
            InvoiceStatus::Sent | InvoiceStatus::Failed => true,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvoiceStatus::Issued => "ISSUED",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Payment method recorded on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Bank transfer — the method every materialized invoice uses.
    Transfer,
    Cash,
    Card,
}

/// Outcome of a single email delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailLogStatus {
    /// Attempt recorded, transport not yet finished.
    Pending,
    Sent,
    Failed,
}

/// One email delivery attempt for an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLog {
    /// Address the invoice was sent to.
    pub recipient: String,
    /// Outcome of the attempt.
    pub status: EmailLogStatus,
    /// Transport error message, for failed attempts.
    pub error: Option<String>,
}

/// An owner's default seller identity, used wherever a template does not
/// override a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Owning user.
    pub owner_id: Uuid,
    /// Legal company name.
    pub company_name: String,
    /// Owner / proprietor name printed on invoices.
    pub owner_name: String,
    /// Full postal address as a single line.
    pub address: String,
    /// Tax identification number (NIP).
    pub nip: String,
    /// Bank account number (IBAN/NRB).
    pub bank_account: String,
    /// Bank name.
    pub bank_name: String,
    /// SWIFT/BIC code, for foreign-currency buyers.
    pub swift: Option<String>,
}

/// Per-template overrides of the seller profile. Each field overrides the
/// owner's default independently; `None` and empty strings both mean "use
/// the profile value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerOverrides {
    pub company_name: Option<String>,
    pub owner_name: Option<String>,
    pub address: Option<String>,
    pub nip: Option<String>,
    pub bank_account: Option<String>,
    pub bank_name: Option<String>,
    pub swift: Option<String>,
}

impl SellerOverrides {
    /// True if no field carries a usable override.
    pub fn is_empty(&self) -> bool {
        [
            &self.company_name,
            &self.owner_name,
            &self.address,
            &self.nip,
            &self.bank_account,
            &self.bank_name,
            &self.swift,
        ]
        .iter()
        .all(|f| f.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

/// Seller details frozen onto an invoice at issuance. Immune to later
/// changes to the profile or template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerSnapshot {
    pub name: String,
    pub owner: String,
    pub address: String,
    pub nip: String,
    pub bank_account: String,
    pub bank_name: String,
    pub swift: Option<String>,
}

/// A client invoices are issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    pub name: String,
    /// Full postal address as a single line.
    pub address: String,
    pub country: String,
    /// Tax identification number.
    pub nip: String,
    /// Contact address, if known. Not used for delivery — templates carry
    /// their own recipient.
    pub email: Option<String>,
}

/// Buyer details frozen onto an invoice at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerSnapshot {
    pub name: String,
    pub address: String,
    pub country: String,
    pub nip: String,
}

impl BuyerSnapshot {
    /// Copy the buyer fields from a client at this instant.
    pub fn of(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            address: client.address.clone(),
            country: client.country.clone(),
            nip: client.nip.clone(),
        }
    }
}

/// One line of a recurring-invoice template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLineItem {
    /// Item name as printed on the invoice.
    pub name: String,
    /// Invoiced quantity.
    pub quantity: Decimal,
    /// Net price per unit.
    pub unit_price_net: Decimal,
    /// VAT rate as an integer percentage, 0–100.
    pub vat_rate: u8,
    /// Position within the template.
    pub sort_order: u32,
}

/// A user-configured recurring-invoice blueprint: client, line items, and
/// issuance preferences. Long-lived and user-edited; never auto-mutated by
/// the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Client invoices from this template are issued to.
    pub client_id: Uuid,
    /// Human label.
    pub name: String,
    /// Only active templates are picked up by the scheduler.
    pub is_active: bool,
    /// Payment term in calendar days; due date = issue date + this.
    pub payment_days: u32,
    /// Place of issuance printed on the invoice.
    pub issue_place: String,
    /// Send the invoice by email right after issuance.
    pub auto_send_email: bool,
    /// Delivery address for auto-send.
    pub recipient_email: Option<String>,
    /// Field-by-field overrides of the owner's seller profile.
    pub seller_overrides: SellerOverrides,
    /// Ordered line items.
    pub items: Vec<TemplateLineItem>,
}

impl Template {
    /// Replace the whole item set. Items are substituted, never merged,
    /// and `sort_order` is renumbered by position.
    pub fn replace_items(&mut self, items: Vec<TemplateLineItem>) {
        self.items = items
            .into_iter()
            .enumerate()
            .map(|(i, mut item)| {
                item.sort_order = i as u32;
                item
            })
            .collect();
    }

    /// Flip the active flag.
    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }
}

/// One computed line of a materialized invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price_net: Decimal,
    /// VAT rate as an integer percentage, 0–100.
    pub vat_rate: u8,
    /// quantity × unit price, rounded to 2 decimal places.
    pub value_net: Decimal,
    /// net × rate / 100, rounded to 2 decimal places.
    pub value_vat: Decimal,
    /// net + VAT, rounded to 2 decimal places.
    pub value_gross: Decimal,
    pub sort_order: u32,
}

/// Invoice totals. Each component is the sum of line values that were
/// independently rounded to 2 decimal places — line-level rounding, which
/// matters for cent-level reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
}

/// A concrete, immutable invoice record. Only `status` and
/// `document_path` change after creation; everything else is frozen at
/// issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Originating template; `None` for manual issuance.
    pub template_id: Option<Uuid>,
    /// Sequential number, formatted `{sequence}/{MM}/{YYYY}`.
    pub number: String,
    /// The recurring cycle this invoice was issued for.
    pub period: Period,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issue_place: String,
    pub payment_method: PaymentMethod,
    /// Seller details copied at issuance time.
    pub seller: SellerSnapshot,
    /// Buyer details copied at issuance time.
    pub buyer: BuyerSnapshot,
    /// Ordered computed line items.
    pub items: Vec<InvoiceLineItem>,
    pub totals: InvoiceTotals,
    /// Gross total spelled out in words.
    pub amount_in_words: String,
    /// ISO 4217 code, `"PLN"` for materialized invoices.
    pub currency: String,
    pub status: InvoiceStatus,
    /// Reference to the generated document, once rendered.
    pub document_path: Option<String>,
    /// Delivery attempts, oldest first.
    pub email_logs: Vec<EmailLog>,
}

/// Owner-scoped listing filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceFilter {
    /// Whether an invoice passes this filter.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.month.is_none_or(|m| invoice.period.month() == m)
            && self.year.is_none_or(|y| invoice.period.year() == y)
            && self.status.is_none_or(|s| invoice.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_rejects_bad_month() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
        assert!(Period::new(2025, 12).is_ok());
    }

    #[test]
    fn period_display() {
        let p = Period::new(2025, 3).unwrap();
        assert_eq!(p.to_string(), "03/2025");
    }

    #[test]
    fn status_transitions_forward_only() {
        use InvoiceStatus::*;
        assert!(Issued.can_transition(Sent));
        assert!(Issued.can_transition(Failed));
        assert!(Failed.can_transition(Sent));
        assert!(Sent.can_transition(Failed));
        assert!(!Sent.can_transition(Issued));
        assert!(!Failed.can_transition(Issued));
    }

    #[test]
    fn replace_items_renumbers_sort_order() {
        let mut template = Template {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            name: "monthly".into(),
            is_active: true,
            payment_days: DEFAULT_PAYMENT_DAYS,
            issue_place: "Warszawa".into(),
            auto_send_email: false,
            recipient_email: None,
            seller_overrides: SellerOverrides::default(),
            items: vec![],
        };
        let item = |name: &str, sort: u32| TemplateLineItem {
            name: name.into(),
            quantity: Decimal::ONE,
            unit_price_net: Decimal::new(100, 0),
            vat_rate: DEFAULT_VAT_RATE,
            sort_order: sort,
        };
        template.replace_items(vec![item("b", 7), item("a", 3)]);
        assert_eq!(template.items[0].sort_order, 0);
        assert_eq!(template.items[0].name, "b");
        assert_eq!(template.items[1].sort_order, 1);
    }

    #[test]
    fn empty_string_overrides_count_as_absent() {
        let overrides = SellerOverrides {
            company_name: Some("  ".into()),
            ..SellerOverrides::default()
        };
        assert!(overrides.is_empty());
    }
}
