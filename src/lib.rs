//! # fakturomat
//!
//! Recurring invoice issuance: reusable templates tied to a client and a
//! set of line items are materialized once per calendar month — on the
//! last business day — into concrete, immutable invoices with sequential
//! numbers, an exact decimal VAT breakdown, and the gross total spelled
//! out in Polish.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating
//! point — and serialize as exact decimal strings. Every entry point takes
//! an explicit "today", so the whole pipeline is deterministic and
//! testable without mocking a clock.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use fakturomat::core::*;
//! use fakturomat::engine::{EmailDispatcher, Materializer, Scheduler};
//! use fakturomat::ports::{DocumentRenderer, EmailSender};
//! use fakturomat::store::MemoryStore;
//! use uuid::Uuid;
//!
//! // Host-supplied collaborators; a real deployment renders PDFs and
//! // speaks SMTP here.
//! struct StubRenderer;
//! impl DocumentRenderer for StubRenderer {
//!     fn render(&self, invoice: &Invoice) -> Result<String, InvoiceError> {
//!         Ok(format!("memory://{}", invoice.number.replace('/', "_")))
//!     }
//! }
//! struct StubSender;
//! impl EmailSender for StubSender {
//!     fn send(&self, _: &Invoice, _: &str) -> Result<(), InvoiceError> {
//!         Ok(())
//!     }
//! }
//!
//! let store = Arc::new(MemoryStore::new());
//! let owner = Uuid::new_v4();
//! store.put_profile(SellerProfile {
//!     owner_id: owner,
//!     company_name: "Consulting sp. z o.o.".into(),
//!     owner_name: "Anna Nowak".into(),
//!     address: "ul. Długa 5, 00-001 Warszawa".into(),
//!     nip: "5252248481".into(),
//!     bank_account: "PL61109010140000071219812874".into(),
//!     bank_name: "mBank".into(),
//!     swift: None,
//! });
//! let client = Client {
//!     id: Uuid::new_v4(),
//!     owner_id: owner,
//!     name: "Klient S.A.".into(),
//!     address: "ul. Krzywa 2, 31-001 Kraków".into(),
//!     country: "Polska".into(),
//!     nip: "6762466849".into(),
//!     email: None,
//! };
//! let template = TemplateBuilder::new(owner, client.id, "Obsługa miesięczna", "Warszawa")
//!     .payment_days(14)
//!     .item("Usługi programistyczne", "1", "15000.00", 23)
//!     .build()
//!     .unwrap();
//! store.put_client(client);
//!
//! use fakturomat::ports::TemplateStore as _;
//! store.upsert(template.clone());
//!
//! let materializer = Materializer::new(
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     Arc::new(StubRenderer),
//! );
//! let dispatcher = EmailDispatcher::new(store.clone(), Arc::new(StubSender));
//! let scheduler = Scheduler::new(store.clone(), materializer, dispatcher);
//!
//! // May 30, 2025 is the last business day of its month.
//! let report = scheduler.run_daily_check(NaiveDate::from_ymd_opt(2025, 5, 30).unwrap());
//! assert!(report.triggered);
//! assert_eq!(report.runs.len(), 1);
//!
//! let invoice = scheduler
//!     .issue_now(template.id, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
//!     .unwrap();
//! assert_eq!(invoice.number, "2/06/2025");
//! assert_eq!(invoice.totals.gross.to_string(), "18450.00");
//! assert_eq!(
//!     invoice.amount_in_words,
//!     "osiemnaście tysięcy czterysta pięćdziesiąt złotych zero groszy"
//! );
//! ```

pub mod core;
pub mod engine;
pub mod ports;
pub mod store;

// Re-export core types at crate root for convenience
pub use crate::core::*;
