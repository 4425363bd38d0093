use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::workflows::access::{AccessError, AccessPolicy};
use crate::workflows::applications::domain::{Application, SlotKind};
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::domain::Actor;
use crate::workflows::notifications::{
    dispatch_all, DispatchReport, NotificationEvent, NotificationKind, Notifier,
    RecipientDirectory,
};
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::plan::{self, SelectionEntry, SelectionPlan, SelectionStatus, SelectionViolation, SlotQuotas};

/// Outcome of a finalization: the tallies plus the notices to deliver.
#[derive(Debug, Clone)]
pub struct FinalizationResult {
    pub selected: u32,
    pub rejected: u32,
    pub total: u32,
    pub notifications: Vec<NotificationEvent>,
}

/// Decides selection rounds over a project's applications.
pub struct SelectionService<J, A, D, N> {
    projects: Arc<J>,
    applications: Arc<A>,
    directory: Arc<D>,
    notifier: Arc<N>,
    access: AccessPolicy,
}

struct OpenRound {
    project: Project,
    applications: Vec<Application>,
    quotas: SlotQuotas,
}

impl<J, A, D, N> SelectionService<J, A, D, N>
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        projects: Arc<J>,
        applications: Arc<A>,
        directory: Arc<D>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            projects,
            applications,
            directory,
            notifier,
            access: AccessPolicy::default(),
        }
    }

    /// Decide the round in one shot from an explicit selection list.
    ///
    /// Chosen candidacies become offers, every other pending one is rejected,
    /// and the writes land atomically or not at all.
    pub fn finalize_selection(
        &self,
        project_id: ProjectId,
        selections: Vec<SelectionEntry>,
        actor: Actor,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<FinalizationResult, SelectionError> {
        let round = self.open_round(project_id, actor)?;
        self.commit(round, &selections, note.as_deref(), now)
    }

    /// Automatic selection: grades at or above the threshold, ranked best
    /// first, scholarship slots filled before volunteer slots.
    pub fn finalize_by_ranking(
        &self,
        project_id: ProjectId,
        actor: Actor,
        threshold: f64,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<FinalizationResult, SelectionError> {
        let round = self.open_round(project_id, actor)?;
        let entries = plan::rank_candidates(&round.applications, threshold, round.quotas);
        info!(
            project = round.project.id.0,
            candidates = entries.len(),
            threshold,
            "ranked selection built"
        );
        self.commit(round, &entries, note.as_deref(), now)
    }

    /// Deliver finalization notices; failures are tallied, never raised.
    pub fn dispatch(&self, events: &[NotificationEvent]) -> DispatchReport {
        dispatch_all(self.notifier.as_ref(), events)
    }

    /// Counter view of a project's round.
    pub fn get_selection_status(
        &self,
        project_id: ProjectId,
    ) -> Result<SelectionStatus, SelectionError> {
        let project = self.existing_project(project_id)?;
        let applications = self.applications.list_for_project(project.id)?;
        Ok(plan::status_of(&applications))
    }

    fn open_round(&self, project_id: ProjectId, actor: Actor) -> Result<OpenRound, SelectionError> {
        let project = self.approved_project(project_id)?;
        self.access.require_selector(actor, project.professor_id)?;
        let applications = self.applications.list_for_project(project.id)?;
        if plan::is_finalized(&applications) {
            return Err(SelectionError::AlreadyFinalized);
        }
        let quotas = SlotQuotas {
            scholarships: project.allocated_scholarships.unwrap_or(0),
            volunteers: project.requested_volunteers,
        };
        Ok(OpenRound {
            project,
            applications,
            quotas,
        })
    }

    fn commit(
        &self,
        round: OpenRound,
        entries: &[SelectionEntry],
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<FinalizationResult, SelectionError> {
        let plan = plan::build_plan(&round.applications, entries, round.quotas)?;
        self.applications.apply_plan(&plan.transitions, now)?;
        info!(
            project = round.project.id.0,
            selected = plan.selected.len(),
            rejected = plan.rejected.len(),
            "selection finalized"
        );

        let notifications = self.build_notices(&round.project, &plan, note);
        Ok(FinalizationResult {
            selected: plan.selected.len() as u32,
            rejected: plan.rejected.len() as u32,
            total: round.applications.len() as u32,
            notifications,
        })
    }

    fn build_notices(
        &self,
        project: &Project,
        plan: &SelectionPlan,
        note: Option<&str>,
    ) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        for (application, slot) in &plan.selected {
            let Some(email) = self.directory.email_of(application.student_id) else {
                warn!(
                    student = application.student_id.0,
                    "no address on file, skipping offer notice"
                );
                continue;
            };
            let kind = match slot {
                SlotKind::Scholarship => NotificationKind::SelectedScholarship,
                SlotKind::Volunteer => NotificationKind::SelectedVolunteer,
            };
            let mut payload = BTreeMap::new();
            payload.insert("project_id".to_string(), project.id.0.to_string());
            payload.insert("project_title".to_string(), project.title.clone());
            payload.insert("slot".to_string(), slot.label().to_string());
            events.push(NotificationEvent {
                application_id: Some(application.id),
                recipient_email: email,
                kind,
                payload,
            });
        }
        for application in &plan.rejected {
            let Some(email) = self.directory.email_of(application.student_id) else {
                warn!(
                    student = application.student_id.0,
                    "no address on file, skipping courtesy notice"
                );
                continue;
            };
            let mut payload = BTreeMap::new();
            payload.insert("project_id".to_string(), project.id.0.to_string());
            payload.insert("project_title".to_string(), project.title.clone());
            if let Some(note) = note {
                payload.insert("note".to_string(), note.to_string());
            }
            events.push(NotificationEvent {
                application_id: Some(application.id),
                recipient_email: email,
                kind: NotificationKind::Rejected,
                payload,
            });
        }
        events
    }

    fn approved_project(&self, id: ProjectId) -> Result<Project, SelectionError> {
        let project = self.existing_project(id)?;
        if project.status != ProjectStatus::Approved {
            return Err(SelectionError::NotApproved {
                status: project.status,
            });
        }
        Ok(project)
    }

    fn existing_project(&self, id: ProjectId) -> Result<Project, SelectionError> {
        self.projects
            .fetch(id)?
            .filter(|project| !project.is_deleted())
            .ok_or(SelectionError::ProjectNotFound)
    }
}

/// Failures surfaced by the selection round operations.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("project does not exist")]
    ProjectNotFound,
    #[error("project is {status}, selection requires an approved project")]
    NotApproved { status: ProjectStatus },
    #[error("applications were already finalized for this project")]
    AlreadyFinalized,
    #[error(transparent)]
    Plan(#[from] SelectionViolation),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
