//! Manual "issue now" flow: materialize a single template on demand,
//! survive a render failure, regenerate the document lazily, and resend
//! a failed email.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use fakturomat::core::*;
use fakturomat::engine::{EmailDispatcher, Materializer, Scheduler};
use fakturomat::ports::{DocumentRenderer, EmailSender, InvoiceStore as _, TemplateStore as _};
use fakturomat::store::MemoryStore;
use uuid::Uuid;

/// Renderer that fails until "repaired".
struct FlakyRenderer {
    broken: AtomicBool,
}

impl DocumentRenderer for FlakyRenderer {
    fn render(&self, invoice: &Invoice) -> Result<String, InvoiceError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(InvoiceError::RenderFailed("wkhtmltopdf crashed".into()));
        }
        Ok(format!("invoices/{}.pdf", invoice.number.replace('/', "_")))
    }
}

struct FlakySender {
    broken: AtomicBool,
}

impl EmailSender for FlakySender {
    fn send(&self, _: &Invoice, recipient: &str) -> Result<(), InvoiceError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(InvoiceError::EmailDelivery("connection refused".into()));
        }
        println!("  [mail] delivered to {recipient}");
        Ok(())
    }
}

fn main() {
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();

    store.put_profile(SellerProfile {
        owner_id: owner,
        company_name: "Studio Graficzne JDG".into(),
        owner_name: "Piotr Zieliński".into(),
        address: "ul. Polna 8, 30-001 Kraków".into(),
        nip: "6762466849".into(),
        bank_account: "PL27114020040000300201355387".into(),
        bank_name: "ING".into(),
        swift: None,
    });
    let client = Client {
        id: Uuid::new_v4(),
        owner_id: owner,
        name: "Wydawnictwo ABC".into(),
        address: "ul. Prosta 12, 00-850 Warszawa".into(),
        country: "Polska".into(),
        nip: "5252248481".into(),
        email: None,
    };
    let template = TemplateBuilder::new(owner, client.id, "Projekty graficzne", "Kraków")
        .auto_send("ksiegowosc@abc.pl")
        .item("Projekt okładki", "3", "800.00", 23)
        .build()
        .unwrap();
    store.put_client(client);
    let template_id = template.id;
    store.upsert(template);

    let renderer = Arc::new(FlakyRenderer {
        broken: AtomicBool::new(true),
    });
    let sender = Arc::new(FlakySender {
        broken: AtomicBool::new(true),
    });

    let materializer = Materializer::new(
        store.clone(),
        store.clone(),
        store.clone(),
        renderer.clone(),
    );
    let dispatcher = EmailDispatcher::new(store.clone(), sender.clone());
    let scheduler = Scheduler::new(store.clone(), materializer, dispatcher);

    // Both collaborators are down: the invoice is still issued.
    let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    let invoice = scheduler.issue_now(template_id, today).unwrap();
    println!(
        "issued {} (document: {:?}, status after failed mail: {})",
        invoice.number,
        invoice.document_path,
        store.invoice(invoice.id).unwrap().status,
    );

    // A second manual attempt for the same month is a conflict.
    let conflict = scheduler.issue_now(template_id, today).unwrap_err();
    println!("re-issue rejected: {conflict}");

    // Collaborators recover: regenerate the document, resend the email.
    renderer.broken.store(false, Ordering::SeqCst);
    sender.broken.store(false, Ordering::SeqCst);

    let materializer = Materializer::new(
        store.clone(),
        store.clone(),
        store.clone(),
        renderer,
    );
    let path = materializer.ensure_document(invoice.id).unwrap();
    println!("document regenerated at {path}");

    let dispatcher = EmailDispatcher::new(store.clone(), sender);
    dispatcher
        .send_invoice(invoice.id, "ksiegowosc@abc.pl")
        .unwrap();

    let final_state = store.invoice(invoice.id).unwrap();
    println!(
        "final status: {} after {} delivery attempts",
        final_state.status,
        final_state.email_logs.len(),
    );
}
