//! Enrollment-window registry: the calendar that gates student applications.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Period, PeriodDraft, PeriodId, PeriodPatch, PeriodPhase};
pub use repository::PeriodRepository;
pub use router::period_router;
pub use service::{PeriodError, PeriodService};
