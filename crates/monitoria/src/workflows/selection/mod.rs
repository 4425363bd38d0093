//! Selection rounds: turning a project's pile of graded candidacies into
//! offers and rejections in one atomic decision, with the notices to send.

pub mod plan;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use plan::{SelectionEntry, SelectionStatus, SelectionViolation};
pub use router::selection_router;
pub use service::{FinalizationResult, SelectionError, SelectionService};
