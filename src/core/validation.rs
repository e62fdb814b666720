use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::Template;

/// Validate a template before it is stored or materialized.
/// Returns all violations found (not just the first).
pub fn validate_template(template: &Template) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if template.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "name must not be empty"));
    }

    if template.issue_place.trim().is_empty() {
        errors.push(ValidationError::new(
            "issue_place",
            "issuance place must not be empty",
        ));
    }

    if template.auto_send_email
        && template
            .recipient_email
            .as_deref()
            .is_none_or(|r| r.trim().is_empty())
    {
        errors.push(ValidationError::new(
            "recipient_email",
            "auto-send requires a recipient address",
        ));
    }

    if let Some(recipient) = template.recipient_email.as_deref() {
        let trimmed = recipient.trim();
        if !trimmed.is_empty() && !trimmed.contains('@') {
            errors.push(ValidationError::new(
                "recipient_email",
                format!("'{trimmed}' is not an email address"),
            ));
        }
    }

    if template.items.is_empty() {
        errors.push(ValidationError::new(
            "items",
            "template must have at least one line item",
        ));
    }

    for (i, item) in template.items.iter().enumerate() {
        let prefix = format!("items[{i}]");

        if item.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{prefix}.name"),
                "item name must not be empty",
            ));
        }

        if item.quantity <= Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("{prefix}.quantity"),
                "quantity must be positive",
            ));
        }

        if item.unit_price_net.is_sign_negative() {
            errors.push(ValidationError::new(
                format!("{prefix}.unit_price_net"),
                "unit net price must not be negative",
            ));
        }

        if item.vat_rate > 100 {
            errors.push(ValidationError::new(
                format!("{prefix}.vat_rate"),
                format!("VAT rate {}% exceeds 100%", item.vat_rate),
            ));
        }
    }

    // Duplicate sort orders would make the printed item order ambiguous.
    let mut orders: Vec<u32> = template.items.iter().map(|i| i.sort_order).collect();
    orders.sort_unstable();
    orders.dedup();
    if orders.len() != template.items.len() {
        errors.push(ValidationError::new(
            "items",
            "sort orders must be unique",
        ));
    }

    errors
}
