use uuid::Uuid;

use super::error::{InvoiceError, validation_failure};
use super::money::parse_amount;
use super::types::{
    DEFAULT_PAYMENT_DAYS, DEFAULT_VAT_RATE, SellerOverrides, Template, TemplateLineItem,
};
use super::validation::validate_template;

/// Builder for recurring-invoice templates.
///
/// Monetary inputs are taken as exact decimal strings and parsed at
/// `build()` time, so a malformed amount surfaces as
/// [`InvoiceError::InvalidAmount`] instead of a silent float conversion.
///
/// ```
/// use fakturomat::core::*;
/// use uuid::Uuid;
///
/// let template = TemplateBuilder::new(Uuid::new_v4(), Uuid::new_v4(), "Abonament", "Warszawa")
///     .payment_days(30)
///     .auto_send("biuro@klient.pl")
///     .item("Obsługa serwisowa", "1", "15000.00", 23)
///     .item("Hosting", "2", "49.99", 23)
///     .build()
///     .unwrap();
///
/// assert_eq!(template.items.len(), 2);
/// assert_eq!(template.items[1].sort_order, 1);
/// ```
pub struct TemplateBuilder {
    owner_id: Uuid,
    client_id: Uuid,
    name: String,
    issue_place: String,
    is_active: bool,
    payment_days: u32,
    auto_send_email: bool,
    recipient_email: Option<String>,
    seller_overrides: SellerOverrides,
    items: Vec<RawItem>,
}

struct RawItem {
    name: String,
    quantity: String,
    unit_price_net: String,
    vat_rate: u8,
}

impl TemplateBuilder {
    pub fn new(
        owner_id: Uuid,
        client_id: Uuid,
        name: impl Into<String>,
        issue_place: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            client_id,
            name: name.into(),
            issue_place: issue_place.into(),
            is_active: true,
            payment_days: DEFAULT_PAYMENT_DAYS,
            auto_send_email: false,
            recipient_email: None,
            seller_overrides: SellerOverrides::default(),
            items: Vec::new(),
        }
    }

    pub fn payment_days(mut self, days: u32) -> Self {
        self.payment_days = days;
        self
    }

    /// Create the template deactivated; the scheduler will skip it.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Enable auto-send to the given recipient after each issuance.
    pub fn auto_send(mut self, recipient: impl Into<String>) -> Self {
        self.auto_send_email = true;
        self.recipient_email = Some(recipient.into());
        self
    }

    /// Set a recipient without enabling auto-send (used for manual
    /// "resend" flows).
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient_email = Some(recipient.into());
        self
    }

    pub fn override_company_name(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.company_name = Some(value.into());
        self
    }

    pub fn override_owner_name(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.owner_name = Some(value.into());
        self
    }

    pub fn override_address(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.address = Some(value.into());
        self
    }

    pub fn override_nip(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.nip = Some(value.into());
        self
    }

    pub fn override_bank_account(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.bank_account = Some(value.into());
        self
    }

    pub fn override_bank_name(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.bank_name = Some(value.into());
        self
    }

    pub fn override_swift(mut self, value: impl Into<String>) -> Self {
        self.seller_overrides.swift = Some(value.into());
        self
    }

    /// Append a line item. Quantity and unit net price are exact decimal
    /// strings; sort order is the append position.
    pub fn item(
        mut self,
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price_net: impl Into<String>,
        vat_rate: u8,
    ) -> Self {
        self.items.push(RawItem {
            name: name.into(),
            quantity: quantity.into(),
            unit_price_net: unit_price_net.into(),
            vat_rate,
        });
        self
    }

    /// Append a line item with the default VAT rate (23%).
    pub fn item_default_vat(
        self,
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price_net: impl Into<String>,
    ) -> Self {
        self.item(name, quantity, unit_price_net, DEFAULT_VAT_RATE)
    }

    /// Build the template, parsing amounts and running validation.
    /// Returns all validation errors joined (not just the first).
    pub fn build(self) -> Result<Template, InvoiceError> {
        let mut items = Vec::with_capacity(self.items.len());
        for (i, raw) in self.items.into_iter().enumerate() {
            let quantity = parse_amount(&raw.quantity)
                .map_err(|e| InvoiceError::InvalidAmount(format!("items[{i}].quantity: {e}")))?;
            let unit_price_net = parse_amount(&raw.unit_price_net).map_err(|e| {
                InvoiceError::InvalidAmount(format!("items[{i}].unit_price_net: {e}"))
            })?;
            items.push(TemplateLineItem {
                name: raw.name,
                quantity,
                unit_price_net,
                vat_rate: raw.vat_rate,
                sort_order: i as u32,
            });
        }

        let template = Template {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            client_id: self.client_id,
            name: self.name,
            is_active: self.is_active,
            payment_days: self.payment_days,
            issue_place: self.issue_place,
            auto_send_email: self.auto_send_email,
            recipient_email: self.recipient_email,
            seller_overrides: self.seller_overrides,
            items,
        };

        let errors = validate_template(&template);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn builder() -> TemplateBuilder {
        TemplateBuilder::new(Uuid::new_v4(), Uuid::new_v4(), "Abonament", "Warszawa")
    }

    #[test]
    fn builds_with_defaults() {
        let t = builder().item_default_vat("Usługa", "1", "100").build().unwrap();
        assert!(t.is_active);
        assert_eq!(t.payment_days, DEFAULT_PAYMENT_DAYS);
        assert_eq!(t.items[0].vat_rate, DEFAULT_VAT_RATE);
        assert_eq!(t.items[0].quantity, dec!(1));
        assert_eq!(t.items[0].unit_price_net, dec!(100));
    }

    #[test]
    fn malformed_amount_is_invalid_amount() {
        let err = builder().item("Usługa", "1", "sto", 23).build().unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidAmount(_)));
    }

    #[test]
    fn validation_failures_surface_joined() {
        let err = builder().build().unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(_)));
        assert!(err.to_string().contains("at least one line item"));
    }

    #[test]
    fn overrides_are_per_field() {
        let t = builder()
            .override_nip("5252248481")
            .item("Usługa", "1", "100", 23)
            .build()
            .unwrap();
        assert_eq!(t.seller_overrides.nip.as_deref(), Some("5252248481"));
        assert!(t.seller_overrides.company_name.is_none());
    }
}
