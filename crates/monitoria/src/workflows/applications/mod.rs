//! Student candidacies: intake during an open window, professor grading, and
//! the student's answer to a selection offer.

pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ScoreBreakdown, SlotKind, SlotPreference,
};
pub use evaluation::EvaluationWeights;
pub use repository::{ApplicationRepository, PlannedTransition};
pub use router::application_router;
pub use service::{ApplicationError, ApplicationService};
