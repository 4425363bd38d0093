use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::workflows::access::{AccessError, AccessPolicy};
use crate::workflows::domain::{AcademicTerm, Actor};
use crate::workflows::periods::domain::{Period, PeriodId};
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::policy::{validate_allocation, validate_pool, AllocationPolicy, AllocationViolation};

/// Post-approval slot adjustments and the term-wide funding pool.
pub struct AllocationService<P, J> {
    periods: Arc<P>,
    projects: Arc<J>,
    policy: AllocationPolicy,
    access: AccessPolicy,
}

impl<P, J> AllocationService<P, J>
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
{
    pub fn new(periods: Arc<P>, projects: Arc<J>, policy: AllocationPolicy) -> Self {
        Self {
            periods,
            projects,
            policy,
            access: AccessPolicy::default(),
        }
    }

    /// Re-grant scholarships on an approved project, bounded per project and
    /// per term pool.
    pub fn adjust_scholarships(
        &self,
        project_id: ProjectId,
        actor: Actor,
        proposed: i64,
        now: DateTime<Utc>,
    ) -> Result<Project, AllocationError> {
        self.access.require_admin(actor)?;
        let mut project = self.approved_project(project_id)?;

        let granted = validate_allocation(project.requested_scholarships, proposed)?;
        let term = project.academic_term();
        if let Some(limit) = self.term_pool(term)? {
            let committed = self.committed_scholarships(term, project.id)?;
            validate_pool(term, limit, committed, granted)?;
        }

        project.allocated_scholarships = Some(granted);
        project.updated_at = now;
        self.projects.update(project.clone())?;
        info!(
            project = project.id.0,
            granted, "scholarship allocation adjusted"
        );
        Ok(project)
    }

    /// Change the volunteer headcount of an approved project.
    pub fn adjust_volunteers(
        &self,
        project_id: ProjectId,
        actor: Actor,
        proposed: i64,
        now: DateTime<Utc>,
    ) -> Result<Project, AllocationError> {
        let mut project = self.approved_project(project_id)?;
        self.access.require_adjuster(actor, project.professor_id)?;

        let granted = self
            .policy
            .validate_volunteer_adjustment(actor.role, proposed)?;
        project.requested_volunteers = granted;
        project.updated_at = now;
        self.projects.update(project.clone())?;
        info!(project = project.id.0, granted, "volunteer count adjusted");
        Ok(project)
    }

    /// Record the funding office's scholarship total on a period.
    pub fn set_term_pool(
        &self,
        period_id: PeriodId,
        actor: Actor,
        total: u32,
    ) -> Result<Period, AllocationError> {
        self.access.require_admin(actor)?;
        let mut period = self
            .periods
            .fetch(period_id)?
            .ok_or(AllocationError::PeriodNotFound)?;
        period.total_scholarships = Some(total);
        self.periods.update(period.clone())?;
        info!(period = period.id.0, total, "term scholarship pool recorded");
        Ok(period)
    }

    fn approved_project(&self, id: ProjectId) -> Result<Project, AllocationError> {
        let project = self
            .projects
            .fetch(id)?
            .filter(|project| !project.is_deleted())
            .ok_or(AllocationError::ProjectNotFound)?;
        if project.status != ProjectStatus::Approved {
            return Err(AllocationError::NotApproved {
                status: project.status,
            });
        }
        Ok(project)
    }

    fn term_pool(&self, term: AcademicTerm) -> Result<Option<u32>, AllocationError> {
        let mut windows: Vec<Period> = self
            .periods
            .list()?
            .into_iter()
            .filter(|period| period.academic_term() == term)
            .collect();
        windows.sort_by_key(|period| period.start_date);
        Ok(windows
            .into_iter()
            .find_map(|period| period.total_scholarships))
    }

    fn committed_scholarships(
        &self,
        term: AcademicTerm,
        exclude: ProjectId,
    ) -> Result<u32, AllocationError> {
        let committed = self
            .projects
            .list_for_term(term)?
            .into_iter()
            .filter(|project| project.id != exclude && !project.is_deleted())
            .filter(|project| project.status == ProjectStatus::Approved)
            .map(|project| project.allocated_scholarships.unwrap_or(0))
            .sum();
        Ok(committed)
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("project not found")]
    ProjectNotFound,
    #[error("enrollment period not found")]
    PeriodNotFound,
    #[error("slot adjustments only apply to approved projects, this one is {status}")]
    NotApproved { status: ProjectStatus },
    #[error(transparent)]
    Policy(#[from] AllocationViolation),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
