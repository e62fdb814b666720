use thiserror::Error;
use uuid::Uuid;

use super::types::{InvoiceStatus, Period};

/// Errors that can occur while computing, materializing, or delivering
/// invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// Malformed or negative monetary input, rejected at the computation
    /// boundary.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An invoice already exists for this template and period.
    #[error("invoice already exists for template {template_id} in period {period}")]
    DuplicateInvoice {
        /// Template whose materialization was attempted.
        template_id: Uuid,
        /// Period the duplicate was found in.
        period: Period,
    },

    /// Invoice number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// The owner has no seller profile and the template overrides do not
    /// cover every required seller field.
    #[error("seller profile missing for owner {owner_id}: {field} is not covered")]
    SellerProfileMissing {
        /// Owner whose profile was looked up.
        owner_id: Uuid,
        /// First seller field that could not be resolved.
        field: &'static str,
    },

    /// Invoice status may only move forward.
    #[error("invoice status cannot change from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: InvoiceStatus,
        /// Requested status.
        to: InvoiceStatus,
    },

    /// Document rendering failed. Non-fatal to issuance; the invoice
    /// persists without a document reference.
    #[error("document rendering failed: {0}")]
    RenderFailed(String),

    /// Email delivery failed. Non-fatal to the invoice's existence.
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. "template" or "client".
        entity: &'static str,
        /// Identifier that failed to resolve.
        id: Uuid,
    },
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "items[2].quantity").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Join a list of validation errors into a single [`InvoiceError::Validation`].
pub(crate) fn validation_failure(errors: &[ValidationError]) -> InvoiceError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    InvoiceError::Validation(msg)
}
