//! Template materialization: turning a template + period into a concrete,
//! immutable invoice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Days, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{
    BuyerSnapshot, CURRENCY_PLN, Invoice, InvoiceError, InvoiceLineItem, InvoiceStatus,
    PaymentMethod, Period, SellerProfile, SellerSnapshot, Template, amount_in_words, line_values,
    next_number, sum_line_values, validate_template, validation_failure,
};
use crate::ports::{ClientDirectory, DocumentRenderer, InvoiceStore, SellerProfileLookup};

/// The materialization engine.
///
/// Number allocation and the subsequent insert run under a per-owner lock,
/// so two materializations for the same owner can never read the same
/// "last invoice" and mint the same number. The store's uniqueness
/// constraints remain the backstop underneath.
pub struct Materializer {
    invoices: Arc<dyn InvoiceStore>,
    profiles: Arc<dyn SellerProfileLookup>,
    clients: Arc<dyn ClientDirectory>,
    renderer: Arc<dyn DocumentRenderer>,
    owner_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Materializer {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        profiles: Arc<dyn SellerProfileLookup>,
        clients: Arc<dyn ClientDirectory>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            invoices,
            profiles,
            clients,
            renderer,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Materialize `template` for `period`, issuing on `today`.
    ///
    /// Fails with [`InvoiceError::DuplicateInvoice`] when the period has
    /// already been handled — the scheduler treats that as "skip", a
    /// manual caller sees it as a conflict. Document rendering is
    /// best-effort: a render failure is logged and the invoice persists
    /// without a document reference.
    pub fn materialize(
        &self,
        template: &Template,
        period: Period,
        today: NaiveDate,
    ) -> Result<Invoice, InvoiceError> {
        let errors = validate_template(template);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        if self
            .invoices
            .find_by_template_period(template.id, period)
            .is_some()
        {
            return Err(InvoiceError::DuplicateInvoice {
                template_id: template.id,
                period,
            });
        }

        let seller = resolve_seller(template, self.profiles.seller_profile(template.owner_id))?;

        let client = self
            .clients
            .client(template.client_id)
            .ok_or(InvoiceError::NotFound {
                entity: "client",
                id: template.client_id,
            })?;
        let buyer = BuyerSnapshot::of(&client);

        let due_date = today
            .checked_add_days(Days::new(u64::from(template.payment_days)))
            .ok_or_else(|| {
                InvoiceError::Validation(format!(
                    "payment term of {} days overflows the calendar",
                    template.payment_days
                ))
            })?;

        let mut items = Vec::with_capacity(template.items.len());
        let mut values = Vec::with_capacity(template.items.len());
        let mut ordered: Vec<_> = template.items.iter().collect();
        ordered.sort_by_key(|i| i.sort_order);
        for item in ordered {
            let v = line_values(item.quantity, item.unit_price_net, item.vat_rate)?;
            items.push(InvoiceLineItem {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price_net: item.unit_price_net,
                vat_rate: item.vat_rate,
                value_net: v.net,
                value_vat: v.vat,
                value_gross: v.gross,
                sort_order: item.sort_order,
            });
            values.push(v);
        }
        let totals = sum_line_values(&values);
        let amount_in_words = amount_in_words(totals.gross)?;

        // Allocation and insert must not interleave for one owner.
        let owner_lock = self.owner_lock(template.owner_id);
        let _guard = owner_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let last = self
            .invoices
            .last_number_in_year(template.owner_id, period.year());
        let number = next_number(last.as_deref(), period)?;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            owner_id: template.owner_id,
            template_id: Some(template.id),
            number: number.to_string(),
            period,
            issue_date: today,
            sale_date: today,
            due_date,
            issue_place: template.issue_place.clone(),
            payment_method: PaymentMethod::Transfer,
            seller,
            buyer,
            items,
            totals,
            amount_in_words,
            currency: CURRENCY_PLN.to_string(),
            status: InvoiceStatus::Issued,
            document_path: None,
            email_logs: Vec::new(),
        };

        let mut invoice = self.invoices.insert(invoice)?;
        drop(_guard);

        info!(
            number = %invoice.number,
            template = %template.name,
            gross = %invoice.totals.gross,
            "invoice issued"
        );

        match self.renderer.render(&invoice) {
            Ok(path) => {
                self.invoices.update_document_path(invoice.id, &path)?;
                invoice.document_path = Some(path);
            }
            Err(e) => {
                // Not fatal: the document is regenerated on first retrieval.
                warn!(number = %invoice.number, error = %e, "document rendering failed");
            }
        }

        Ok(invoice)
    }

    /// Return the invoice's document reference, rendering it now if the
    /// issuance-time render failed or was never attempted.
    pub fn ensure_document(&self, invoice_id: Uuid) -> Result<String, InvoiceError> {
        let invoice = self.invoices.invoice(invoice_id).ok_or(InvoiceError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })?;

        if let Some(path) = invoice.document_path {
            return Ok(path);
        }

        let path = self.renderer.render(&invoice)?;
        self.invoices.update_document_path(invoice_id, &path)?;
        Ok(path)
    }

    fn owner_lock(&self, owner_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self
            .owner_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(owner_id).or_default().clone()
    }
}

/// Resolve the effective seller: template override per field (empty
/// strings count as absent), falling back to the owner's profile.
fn resolve_seller(
    template: &Template,
    profile: Option<SellerProfile>,
) -> Result<SellerSnapshot, InvoiceError> {
    let overrides = &template.seller_overrides;
    let owner_id = template.owner_id;

    let field = |over: &Option<String>,
                 from_profile: Option<&str>,
                 name: &'static str|
     -> Result<String, InvoiceError> {
        if let Some(value) = non_empty(over) {
            return Ok(value.to_string());
        }
        match from_profile {
            Some(value) => Ok(value.to_string()),
            None => Err(InvoiceError::SellerProfileMissing {
                owner_id,
                field: name,
            }),
        }
    };

    let p = profile.as_ref();
    Ok(SellerSnapshot {
        name: field(
            &overrides.company_name,
            p.map(|p| p.company_name.as_str()),
            "company name",
        )?,
        owner: field(
            &overrides.owner_name,
            p.map(|p| p.owner_name.as_str()),
            "owner name",
        )?,
        address: field(&overrides.address, p.map(|p| p.address.as_str()), "address")?,
        nip: field(&overrides.nip, p.map(|p| p.nip.as_str()), "tax id")?,
        bank_account: field(
            &overrides.bank_account,
            p.map(|p| p.bank_account.as_str()),
            "bank account",
        )?,
        bank_name: field(
            &overrides.bank_name,
            p.map(|p| p.bank_name.as_str()),
            "bank name",
        )?,
        swift: non_empty(&overrides.swift)
            .map(str::to_string)
            .or_else(|| p.and_then(|p| p.swift.clone())),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
