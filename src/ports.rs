//! Collaborator ports the issuance pipeline talks to.
//!
//! The core never renders documents, speaks SMTP, or owns a database —
//! it drives these abstract ports. [`crate::store::MemoryStore`]
//! implements the storage ports for embedded use and tests; document
//! rendering and email transport are always supplied by the host.

use uuid::Uuid;

use crate::core::{
    Client, EmailLog, EmailLogStatus, Invoice, InvoiceError, InvoiceFilter, InvoiceStatus, Period,
    SellerProfile, Template,
};

/// Look up an owner's default seller profile.
pub trait SellerProfileLookup: Send + Sync {
    fn seller_profile(&self, owner_id: Uuid) -> Option<SellerProfile>;
}

/// Resolve the client a template is linked to.
pub trait ClientDirectory: Send + Sync {
    fn client(&self, client_id: Uuid) -> Option<Client>;
}

/// Generate the invoice document.
///
/// Returns an artifact reference (typically a file path). Failures map to
/// [`InvoiceError::RenderFailed`]; the pipeline treats them as non-fatal
/// and regenerates lazily on first retrieval.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, invoice: &Invoice) -> Result<String, InvoiceError>;
}

/// Deliver an invoice by email.
///
/// Failures map to [`InvoiceError::EmailDelivery`]; they never undo the
/// issued invoice.
pub trait EmailSender: Send + Sync {
    fn send(&self, invoice: &Invoice, recipient: &str) -> Result<(), InvoiceError>;
}

/// Template persistence.
pub trait TemplateStore: Send + Sync {
    /// Templates eligible for the daily run.
    fn list_active(&self) -> Vec<Template>;

    fn template(&self, id: Uuid) -> Option<Template>;

    /// Insert or fully replace a template aggregate (items included —
    /// replace semantics, never a merge).
    fn upsert(&self, template: Template);

    fn remove(&self, id: Uuid);
}

/// Invoice persistence.
///
/// Implementations must enforce two constraints *atomically inside*
/// [`insert`](InvoiceStore::insert), not check-then-insert:
/// at most one invoice per `(template, period)`, and no duplicate number
/// per owner and year. The first maps to
/// [`InvoiceError::DuplicateInvoice`]; the second is a correctness bug
/// surfaced as [`InvoiceError::Numbering`].
pub trait InvoiceStore: Send + Sync {
    fn find_by_template_period(&self, template_id: Uuid, period: Period) -> Option<Invoice>;

    /// Persist a freshly materialized invoice with its line items as one
    /// atomic unit.
    fn insert(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;

    fn invoice(&self, id: Uuid) -> Option<Invoice>;

    /// Owner-scoped listing, newest first.
    fn list(&self, owner_id: Uuid, filter: InvoiceFilter) -> Vec<Invoice>;

    /// Number of the owner's most recently created invoice whose period
    /// falls in `year`, across all months and templates.
    fn last_number_in_year(&self, owner_id: Uuid, year: i32) -> Option<String>;

    /// Update the status, enforcing forward-only transitions.
    fn update_status(&self, id: Uuid, status: InvoiceStatus) -> Result<Invoice, InvoiceError>;

    /// Attach the generated document reference.
    fn update_document_path(&self, id: Uuid, path: &str) -> Result<(), InvoiceError>;

    /// Append a delivery-attempt log entry; returns its index.
    fn append_email_log(&self, id: Uuid, log: EmailLog) -> Result<usize, InvoiceError>;

    /// Finalize a previously appended log entry.
    fn update_email_log(
        &self,
        id: Uuid,
        index: usize,
        status: EmailLogStatus,
        error: Option<String>,
    ) -> Result<(), InvoiceError>;
}
