//! The daily recurrence check and batch generation run.
//!
//! The timer itself lives outside the crate: a host cron/timer calls
//! [`Scheduler::run_daily_check`] once per day with an explicit "today",
//! which keeps the trigger decision and the generation action pure and
//! testable. The calendar gate and the per-template action are separate
//! units; [`Scheduler::issue_now`] is the manual trigger that bypasses
//! the gate.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::{Invoice, InvoiceError, Period, Template, is_last_business_day};
use crate::engine::mailer::EmailDispatcher;
use crate::engine::materialize::Materializer;
use crate::ports::TemplateStore;

/// Drives the once-a-day recurrence cycle over all active templates.
pub struct Scheduler {
    templates: Arc<dyn TemplateStore>,
    materializer: Materializer,
    dispatcher: EmailDispatcher,
}

/// What a single daily check did.
#[derive(Debug)]
pub struct DailyRunReport {
    /// The "today" the check ran for.
    pub today: NaiveDate,
    /// Whether today was the trigger day. `false` means no-op.
    pub triggered: bool,
    /// Per-template outcomes, in processing order. Empty when not
    /// triggered.
    pub runs: Vec<TemplateRun>,
}

/// Outcome for one template within a run.
#[derive(Debug)]
pub struct TemplateRun {
    pub template_id: Uuid,
    pub template_name: String,
    pub outcome: RunOutcome,
}

/// How processing one template ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// A new invoice was issued.
    Issued {
        number: String,
        /// Auto-send result, when the template asked for it.
        email: Option<EmailOutcome>,
    },
    /// The period already has an invoice for this template; nothing to do.
    AlreadyIssued,
    /// Materialization failed; siblings were not affected.
    Failed(String),
}

/// Auto-send result for an issued invoice.
#[derive(Debug)]
pub enum EmailOutcome {
    Sent,
    /// Delivery failed; the invoice stays issued with status `FAILED`.
    Failed(String),
}

impl Scheduler {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        materializer: Materializer,
        dispatcher: EmailDispatcher,
    ) -> Self {
        Self {
            templates,
            materializer,
            dispatcher,
        }
    }

    /// The once-per-day entry point: checks the calendar gate and, on the
    /// trigger day, materializes every active template for the current
    /// period. Per-template failures are isolated — they are reported and
    /// logged, never aborting the rest of the batch.
    pub fn run_daily_check(&self, today: NaiveDate) -> DailyRunReport {
        if !is_last_business_day(today) {
            info!(%today, "not the last business day, skipping generation");
            return DailyRunReport {
                today,
                triggered: false,
                runs: Vec::new(),
            };
        }

        info!(%today, "last business day, generating invoices");
        DailyRunReport {
            today,
            triggered: true,
            runs: self.run_generation(today),
        }
    }

    /// Materialize every active template for `today`'s period, without
    /// consulting the calendar gate.
    pub fn run_generation(&self, today: NaiveDate) -> Vec<TemplateRun> {
        let period = Period::from_date(today);
        let templates = self.templates.list_active();
        info!(count = templates.len(), %period, "processing active templates");

        templates
            .iter()
            .map(|template| self.process_template(template, period, today))
            .collect()
    }

    /// Manual "issue now" for a single template, bypassing the calendar
    /// check. A duplicate for the period surfaces as a conflict.
    pub fn issue_now(&self, template_id: Uuid, today: NaiveDate) -> Result<Invoice, InvoiceError> {
        let template = self
            .templates
            .template(template_id)
            .ok_or(InvoiceError::NotFound {
                entity: "template",
                id: template_id,
            })?;
        let invoice = self
            .materializer
            .materialize(&template, Period::from_date(today), today)?;

        if let Some(recipient) = auto_send_recipient(&template) {
            // Delivery failure marks the invoice FAILED but does not undo
            // the issuance.
            let _ = self.dispatcher.send_invoice(invoice.id, recipient);
        }
        Ok(invoice)
    }

    fn process_template(
        &self,
        template: &Template,
        period: Period,
        today: NaiveDate,
    ) -> TemplateRun {
        let outcome = match self.materializer.materialize(template, period, today) {
            Ok(invoice) => {
                let email = auto_send_recipient(template).map(|recipient| {
                    match self.dispatcher.send_invoice(invoice.id, recipient) {
                        Ok(()) => EmailOutcome::Sent,
                        Err(e) => EmailOutcome::Failed(e.to_string()),
                    }
                });
                RunOutcome::Issued {
                    number: invoice.number,
                    email,
                }
            }
            Err(InvoiceError::DuplicateInvoice { .. }) => {
                info!(template = %template.name, %period, "invoice already exists, skipping");
                RunOutcome::AlreadyIssued
            }
            Err(e) => {
                error!(template = %template.name, error = %e, "template processing failed");
                RunOutcome::Failed(e.to_string())
            }
        };

        TemplateRun {
            template_id: template.id,
            template_name: template.name.clone(),
            outcome,
        }
    }
}

fn auto_send_recipient(template: &Template) -> Option<&str> {
    if !template.auto_send_email {
        return None;
    }
    template
        .recipient_email
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
}
