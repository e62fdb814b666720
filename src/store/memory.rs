//! In-memory reference store.
//!
//! One interior mutex makes every storage operation a single critical
//! section, which is what gives [`InvoiceStore::insert`] its required
//! atomicity: both uniqueness constraints are checked and the row is
//! appended under the same lock. "Most recently created" is defined by a
//! monotonic insertion sequence, not a wall clock, so the pipeline stays
//! deterministic under test.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::core::{
    Client, EmailLog, EmailLogStatus, Invoice, InvoiceError, InvoiceFilter, InvoiceStatus, Period,
    SellerProfile, Template,
};
use crate::ports::{ClientDirectory, InvoiceStore, SellerProfileLookup, TemplateStore};

/// Thread-safe in-memory store implementing every persistence port.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, SellerProfile>,
    clients: HashMap<Uuid, Client>,
    templates: HashMap<Uuid, Template>,
    invoices: HashMap<Uuid, StoredInvoice>,
    insert_seq: u64,
}

struct StoredInvoice {
    /// Monotonic creation order, used for "most recently created".
    seq: u64,
    invoice: Invoice,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Poisoned state is still structurally intact.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed or replace an owner's seller profile.
    pub fn put_profile(&self, profile: SellerProfile) {
        self.state().profiles.insert(profile.owner_id, profile);
    }

    /// Remove an owner's seller profile.
    pub fn remove_profile(&self, owner_id: Uuid) {
        self.state().profiles.remove(&owner_id);
    }

    /// Seed or replace a client.
    pub fn put_client(&self, client: Client) {
        self.state().clients.insert(client.id, client);
    }
}

impl SellerProfileLookup for MemoryStore {
    fn seller_profile(&self, owner_id: Uuid) -> Option<SellerProfile> {
        self.state().profiles.get(&owner_id).cloned()
    }
}

impl ClientDirectory for MemoryStore {
    fn client(&self, client_id: Uuid) -> Option<Client> {
        self.state().clients.get(&client_id).cloned()
    }
}

impl TemplateStore for MemoryStore {
    fn list_active(&self) -> Vec<Template> {
        let mut active: Vec<Template> = self
            .state()
            .templates
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        active
    }

    fn template(&self, id: Uuid) -> Option<Template> {
        self.state().templates.get(&id).cloned()
    }

    fn upsert(&self, template: Template) {
        self.state().templates.insert(template.id, template);
    }

    fn remove(&self, id: Uuid) {
        self.state().templates.remove(&id);
    }
}

impl InvoiceStore for MemoryStore {
    fn find_by_template_period(&self, template_id: Uuid, period: Period) -> Option<Invoice> {
        self.state()
            .invoices
            .values()
            .find(|s| s.invoice.template_id == Some(template_id) && s.invoice.period == period)
            .map(|s| s.invoice.clone())
    }

    fn insert(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
        let mut state = self.state();

        if let Some(template_id) = invoice.template_id {
            let duplicate = state.invoices.values().any(|s| {
                s.invoice.template_id == Some(template_id) && s.invoice.period == invoice.period
            });
            if duplicate {
                return Err(InvoiceError::DuplicateInvoice {
                    template_id,
                    period: invoice.period,
                });
            }
        }

        // Numbers embed their year, so owner + number equality covers the
        // per-owner-per-year constraint.
        let number_taken = state
            .invoices
            .values()
            .any(|s| s.invoice.owner_id == invoice.owner_id && s.invoice.number == invoice.number);
        if number_taken {
            return Err(InvoiceError::Numbering(format!(
                "invoice number {} already exists for owner {}",
                invoice.number, invoice.owner_id
            )));
        }

        state.insert_seq += 1;
        let seq = state.insert_seq;
        state
            .invoices
            .insert(invoice.id, StoredInvoice { seq, invoice: invoice.clone() });
        Ok(invoice)
    }

    fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.state().invoices.get(&id).map(|s| s.invoice.clone())
    }

    fn list(&self, owner_id: Uuid, filter: InvoiceFilter) -> Vec<Invoice> {
        let state = self.state();
        let mut matches: Vec<&StoredInvoice> = state
            .invoices
            .values()
            .filter(|s| s.invoice.owner_id == owner_id && filter.matches(&s.invoice))
            .collect();
        matches.sort_by(|a, b| b.seq.cmp(&a.seq));
        matches.into_iter().map(|s| s.invoice.clone()).collect()
    }

    fn last_number_in_year(&self, owner_id: Uuid, year: i32) -> Option<String> {
        self.state()
            .invoices
            .values()
            .filter(|s| s.invoice.owner_id == owner_id && s.invoice.period.year() == year)
            .max_by_key(|s| s.seq)
            .map(|s| s.invoice.number.clone())
    }

    fn update_status(&self, id: Uuid, status: InvoiceStatus) -> Result<Invoice, InvoiceError> {
        let mut state = self.state();
        let stored = state
            .invoices
            .get_mut(&id)
            .ok_or(InvoiceError::NotFound { entity: "invoice", id })?;
        if !stored.invoice.status.can_transition(status) {
            return Err(InvoiceError::InvalidTransition {
                from: stored.invoice.status,
                to: status,
            });
        }
        stored.invoice.status = status;
        Ok(stored.invoice.clone())
    }

    fn update_document_path(&self, id: Uuid, path: &str) -> Result<(), InvoiceError> {
        let mut state = self.state();
        let stored = state
            .invoices
            .get_mut(&id)
            .ok_or(InvoiceError::NotFound { entity: "invoice", id })?;
        stored.invoice.document_path = Some(path.to_string());
        Ok(())
    }

    fn append_email_log(&self, id: Uuid, log: EmailLog) -> Result<usize, InvoiceError> {
        let mut state = self.state();
        let stored = state
            .invoices
            .get_mut(&id)
            .ok_or(InvoiceError::NotFound { entity: "invoice", id })?;
        stored.invoice.email_logs.push(log);
        Ok(stored.invoice.email_logs.len() - 1)
    }

    fn update_email_log(
        &self,
        id: Uuid,
        index: usize,
        status: EmailLogStatus,
        error: Option<String>,
    ) -> Result<(), InvoiceError> {
        let mut state = self.state();
        let stored = state
            .invoices
            .get_mut(&id)
            .ok_or(InvoiceError::NotFound { entity: "invoice", id })?;
        let log = stored
            .invoice
            .email_logs
            .get_mut(index)
            .ok_or(InvoiceError::NotFound { entity: "email log", id })?;
        log.status = status;
        log.error = error;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        BuyerSnapshot, InvoiceTotals, PaymentMethod, SellerSnapshot, CURRENCY_PLN,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(owner_id: Uuid, template_id: Option<Uuid>, number: &str, period: Period) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            owner_id,
            template_id,
            number: number.to_string(),
            period,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            sale_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 14).unwrap(),
            issue_place: "Warszawa".into(),
            payment_method: PaymentMethod::Transfer,
            seller: SellerSnapshot {
                name: "Firma".into(),
                owner: "Jan".into(),
                address: "ul. Prosta 1".into(),
                nip: "1111111111".into(),
                bank_account: "PL61109010140000071219812874".into(),
                bank_name: "Bank".into(),
                swift: None,
            },
            buyer: BuyerSnapshot {
                name: "Klient".into(),
                address: "ul. Krzywa 2".into(),
                country: "Polska".into(),
                nip: "2222222222".into(),
            },
            items: vec![],
            totals: InvoiceTotals {
                net: dec!(100),
                vat: dec!(23),
                gross: dec!(123),
            },
            amount_in_words: "sto dwadzieścia trzy złote zero groszy".into(),
            currency: CURRENCY_PLN.into(),
            status: InvoiceStatus::Issued,
            document_path: None,
            email_logs: vec![],
        }
    }

    fn period(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn insert_enforces_template_period_uniqueness() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let template = Uuid::new_v4();
        let p = period(2025, 3);

        store
            .insert(invoice(owner, Some(template), "1/03/2025", p))
            .unwrap();
        let err = store
            .insert(invoice(owner, Some(template), "2/03/2025", p))
            .unwrap_err();
        assert!(matches!(err, InvoiceError::DuplicateInvoice { .. }));
    }

    #[test]
    fn manual_invoices_do_not_collide_on_period() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let p = period(2025, 3);

        store.insert(invoice(owner, None, "1/03/2025", p)).unwrap();
        assert!(store.insert(invoice(owner, None, "2/03/2025", p)).is_ok());
    }

    #[test]
    fn insert_rejects_duplicate_numbers() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        store
            .insert(invoice(owner, Some(Uuid::new_v4()), "1/03/2025", period(2025, 3)))
            .unwrap();
        let err = store
            .insert(invoice(owner, Some(Uuid::new_v4()), "1/03/2025", period(2025, 3)))
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Numbering(_)));
    }

    #[test]
    fn duplicate_number_allowed_across_owners() {
        let store = MemoryStore::new();
        store
            .insert(invoice(Uuid::new_v4(), None, "1/03/2025", period(2025, 3)))
            .unwrap();
        assert!(
            store
                .insert(invoice(Uuid::new_v4(), None, "1/03/2025", period(2025, 3)))
                .is_ok()
        );
    }

    #[test]
    fn last_number_tracks_creation_order_not_month() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        store.insert(invoice(owner, None, "1/05/2025", period(2025, 5))).unwrap();
        store.insert(invoice(owner, None, "2/03/2025", period(2025, 3))).unwrap();

        // The March invoice was created later; it is the most recent.
        assert_eq!(
            store.last_number_in_year(owner, 2025).as_deref(),
            Some("2/03/2025")
        );
        assert_eq!(store.last_number_in_year(owner, 2024), None);
    }

    #[test]
    fn status_updates_are_forward_only() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let inv = store
            .insert(invoice(owner, None, "1/03/2025", period(2025, 3)))
            .unwrap();

        store.update_status(inv.id, InvoiceStatus::Failed).unwrap();
        store.update_status(inv.id, InvoiceStatus::Sent).unwrap();
        let err = store.update_status(inv.id, InvoiceStatus::Issued).unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidTransition { .. }));
    }

    #[test]
    fn listing_filters_and_orders_newest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        store.insert(invoice(owner, None, "1/02/2025", period(2025, 2))).unwrap();
        store.insert(invoice(owner, None, "2/03/2025", period(2025, 3))).unwrap();
        store.insert(invoice(owner, None, "3/03/2025", period(2025, 3))).unwrap();

        let march = store.list(
            owner,
            InvoiceFilter {
                month: Some(3),
                year: Some(2025),
                status: None,
            },
        );
        assert_eq!(march.len(), 2);
        assert_eq!(march[0].number, "3/03/2025");

        let all = store.list(owner, InvoiceFilter::default());
        assert_eq!(all.len(), 3);
        assert!(store.list(Uuid::new_v4(), InvoiceFilter::default()).is_empty());
    }

    #[test]
    fn email_log_lifecycle() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let inv = store
            .insert(invoice(owner, None, "1/03/2025", period(2025, 3)))
            .unwrap();

        let idx = store
            .append_email_log(
                inv.id,
                EmailLog {
                    recipient: "biuro@klient.pl".into(),
                    status: EmailLogStatus::Pending,
                    error: None,
                },
            )
            .unwrap();
        store
            .update_email_log(inv.id, idx, EmailLogStatus::Failed, Some("timeout".into()))
            .unwrap();

        let stored = store.invoice(inv.id).unwrap();
        assert_eq!(stored.email_logs.len(), 1);
        assert_eq!(stored.email_logs[0].status, EmailLogStatus::Failed);
        assert_eq!(stored.email_logs[0].error.as_deref(), Some("timeout"));
    }
}
