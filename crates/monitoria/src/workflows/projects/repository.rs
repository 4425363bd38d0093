use crate::workflows::domain::AcademicTerm;
use crate::workflows::repository::RepositoryError;

use super::domain::{Project, ProjectId};

/// Storage boundary for project proposals.
///
/// Soft deletion is an `update` that stamps `deleted_at`; listing returns
/// deleted rows too and the services filter them.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, project: Project) -> Result<(), RepositoryError>;
    fn update(&self, project: Project) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn list_for_term(&self, term: AcademicTerm) -> Result<Vec<Project>, RepositoryError>;
}
