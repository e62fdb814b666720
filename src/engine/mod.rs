//! The issuance pipeline: materialization, email dispatch, and the daily
//! recurrence scheduler.

mod mailer;
mod materialize;
mod scheduler;

pub use mailer::EmailDispatcher;
pub use materialize::Materializer;
pub use scheduler::{DailyRunReport, EmailOutcome, RunOutcome, Scheduler, TemplateRun};
