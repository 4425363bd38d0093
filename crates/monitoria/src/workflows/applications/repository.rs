use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{AcademicTerm, UserId};
use crate::workflows::projects::domain::ProjectId;
use crate::workflows::repository::RepositoryError;

use super::domain::{Application, ApplicationId, ApplicationStatus};

/// One status move inside a finalization plan, carrying the prior status the
/// store must re-check before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTransition {
    pub application_id: ApplicationId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Storage boundary for applications.
///
/// `apply_plan` is the one bulk operation: all transitions land or none do,
/// and any row whose current status no longer matches its planned `from` is a
/// conflict, which is how finalization guards survive concurrent writers.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<(), RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list_for_project(&self, project: ProjectId) -> Result<Vec<Application>, RepositoryError>;
    fn any_for_term(&self, term: AcademicTerm) -> Result<bool, RepositoryError>;
    fn any_for_student_project(
        &self,
        student: UserId,
        project: ProjectId,
    ) -> Result<bool, RepositoryError>;
    fn any_accepted_scholarship(
        &self,
        student: UserId,
        term: AcademicTerm,
    ) -> Result<bool, RepositoryError>;
    fn apply_plan(
        &self,
        transitions: &[PlannedTransition],
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}
