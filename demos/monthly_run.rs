//! Full monthly cycle: seed an owner with two templates, run the daily
//! check on an ordinary day and on the trigger day, and print the report.

use std::sync::Arc;

use chrono::NaiveDate;
use fakturomat::core::*;
use fakturomat::engine::{EmailDispatcher, Materializer, RunOutcome, Scheduler};
use fakturomat::ports::{DocumentRenderer, EmailSender, InvoiceStore as _, TemplateStore as _};
use fakturomat::store::MemoryStore;
use uuid::Uuid;

struct StubRenderer;

impl DocumentRenderer for StubRenderer {
    fn render(&self, invoice: &Invoice) -> Result<String, InvoiceError> {
        Ok(format!("invoices/{}.pdf", invoice.number.replace('/', "_")))
    }
}

struct PrintingSender;

impl EmailSender for PrintingSender {
    fn send(&self, invoice: &Invoice, recipient: &str) -> Result<(), InvoiceError> {
        println!("  [mail] {} -> {recipient}", invoice.number);
        Ok(())
    }
}

fn main() {
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();

    store.put_profile(SellerProfile {
        owner_id: owner,
        company_name: "Consulting sp. z o.o.".into(),
        owner_name: "Anna Nowak".into(),
        address: "ul. Długa 5, 00-001 Warszawa".into(),
        nip: "5252248481".into(),
        bank_account: "PL61109010140000071219812874".into(),
        bank_name: "mBank".into(),
        swift: None,
    });

    let client = Client {
        id: Uuid::new_v4(),
        owner_id: owner,
        name: "Klient S.A.".into(),
        address: "ul. Krzywa 2, 31-001 Kraków".into(),
        country: "Polska".into(),
        nip: "6762466849".into(),
        email: None,
    };

    let dev_services = TemplateBuilder::new(owner, client.id, "Usługi programistyczne", "Warszawa")
        .payment_days(14)
        .auto_send("faktury@klient.pl")
        .item("Rozwój oprogramowania", "1", "15000.00", 23)
        .build()
        .unwrap();
    let hosting = TemplateBuilder::new(owner, client.id, "Utrzymanie serwera", "Warszawa")
        .payment_days(7)
        .item("Hosting", "1", "499.00", 23)
        .item("Monitoring", "2", "149.50", 23)
        .build()
        .unwrap();
    store.put_client(client);
    store.upsert(dev_services);
    store.upsert(hosting);

    let materializer = Materializer::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(StubRenderer),
    );
    let dispatcher = EmailDispatcher::new(store.clone(), Arc::new(PrintingSender));
    let scheduler = Scheduler::new(store.clone(), materializer, dispatcher);

    // An ordinary Thursday: nothing happens.
    let quiet = scheduler.run_daily_check(NaiveDate::from_ymd_opt(2025, 5, 29).unwrap());
    println!("2025-05-29: triggered = {}", quiet.triggered);

    // May 31, 2025 is a Saturday, so Friday the 30th is the trigger day.
    let report = scheduler.run_daily_check(NaiveDate::from_ymd_opt(2025, 5, 30).unwrap());
    println!("2025-05-30: triggered = {}", report.triggered);

    for run in &report.runs {
        match &run.outcome {
            RunOutcome::Issued { number, email } => {
                println!("  issued {number} for '{}' (email: {email:?})", run.template_name)
            }
            RunOutcome::AlreadyIssued => {
                println!("  '{}' already handled", run.template_name)
            }
            RunOutcome::Failed(reason) => {
                println!("  '{}' failed: {reason}", run.template_name)
            }
        }
    }

    println!("--- invoices ---");
    for invoice in store.list(owner, InvoiceFilter::default()) {
        println!(
            "{}  {}  net {} / VAT {} / gross {} {}  [{}]",
            invoice.number,
            invoice.buyer.name,
            format_pln(invoice.totals.net),
            format_pln(invoice.totals.vat),
            format_pln(invoice.totals.gross),
            invoice.currency,
            invoice.status,
        );
        println!("  słownie: {}", invoice.amount_in_words);
    }
}
