//! Project lifecycle: a professor's proposal moving from draft through
//! signatures and review to an allocation decision.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Project, ProjectAction, ProjectChanges, ProjectDraft, ProjectId, ProjectStatus};
pub use repository::ProjectRepository;
pub use router::project_router;
pub use service::{ProjectError, ProjectService};
