//! Email dispatch: drives the [`EmailSender`] port, records every attempt
//! in the invoice's email log, and moves the invoice status forward.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{EmailLog, EmailLogStatus, InvoiceError, InvoiceStatus};
use crate::ports::{EmailSender, InvoiceStore};

/// Sends issued invoices to a recipient address.
///
/// Each call is one delivery attempt: a `Pending` log entry is written
/// first, then finalized to `Sent` or `Failed` together with the invoice
/// status. A failed delivery never rolls back the invoice — retrying is
/// simply calling this again ("resend").
pub struct EmailDispatcher {
    invoices: Arc<dyn InvoiceStore>,
    sender: Arc<dyn EmailSender>,
}

impl EmailDispatcher {
    pub fn new(invoices: Arc<dyn InvoiceStore>, sender: Arc<dyn EmailSender>) -> Self {
        Self { invoices, sender }
    }

    /// Deliver the invoice to `recipient` and record the outcome.
    pub fn send_invoice(&self, invoice_id: Uuid, recipient: &str) -> Result<(), InvoiceError> {
        let invoice = self.invoices.invoice(invoice_id).ok_or(InvoiceError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })?;

        let log_index = self.invoices.append_email_log(
            invoice_id,
            EmailLog {
                recipient: recipient.to_string(),
                status: EmailLogStatus::Pending,
                error: None,
            },
        )?;

        match self.sender.send(&invoice, recipient) {
            Ok(()) => {
                self.invoices
                    .update_email_log(invoice_id, log_index, EmailLogStatus::Sent, None)?;
                self.invoices
                    .update_status(invoice_id, InvoiceStatus::Sent)?;
                info!(number = %invoice.number, recipient, "invoice emailed");
                Ok(())
            }
            Err(e) => {
                self.invoices.update_email_log(
                    invoice_id,
                    log_index,
                    EmailLogStatus::Failed,
                    Some(e.to_string()),
                )?;
                self.invoices
                    .update_status(invoice_id, InvoiceStatus::Failed)?;
                warn!(number = %invoice.number, recipient, error = %e, "invoice email failed");
                Err(e)
            }
        }
    }
}
