use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::workflows::access::{AccessError, AccessPolicy};
use crate::workflows::allocation::policy::{validate_allocation, AllocationViolation};
use crate::workflows::domain::{
    year_supported, Actor, MAX_ACADEMIC_YEAR, MIN_ACADEMIC_YEAR,
};
use crate::workflows::notifications::{
    NotificationEvent, NotificationKind, Notifier, RecipientDirectory,
};
use crate::workflows::repository::RepositoryError;

use super::domain::{Project, ProjectAction, ProjectChanges, ProjectDraft, ProjectId, ProjectStatus};
use super::repository::ProjectRepository;

/// Service driving a proposal from draft through signatures to a decision.
///
/// Notification delivery is best-effort: a failed send is logged and never
/// rolls back the transition that produced it.
pub struct ProjectService<J, N, D> {
    projects: Arc<J>,
    notifier: Arc<N>,
    directory: Arc<D>,
    access: AccessPolicy,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    ProjectId(PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<J, N, D> ProjectService<J, N, D>
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    pub fn new(projects: Arc<J>, notifier: Arc<N>, directory: Arc<D>) -> Self {
        Self {
            projects,
            notifier,
            directory,
            access: AccessPolicy::default(),
        }
    }

    /// Open a new draft owned by the acting professor.
    pub fn create_project(
        &self,
        draft: ProjectDraft,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        self.access.require_professor(actor)?;
        if draft.title.trim().is_empty() {
            return Err(ProjectError::EmptyTitle);
        }
        if !year_supported(draft.year) {
            return Err(ProjectError::UnsupportedYear { year: draft.year });
        }

        let project = Project {
            id: next_project_id(),
            title: draft.title,
            professor_id: actor.id,
            department_id: draft.department_id,
            year: draft.year,
            term: draft.term,
            requested_scholarships: draft.requested_scholarships,
            requested_volunteers: draft.requested_volunteers,
            allocated_scholarships: None,
            status: ProjectStatus::Draft,
            professor_signature: None,
            admin_signature: None,
            admin_feedback: None,
            deleted_at: None,
            updated_at: now,
        };
        self.projects.insert(project.clone())?;
        info!(project = project.id.0, "project draft opened");
        Ok(project)
    }

    /// Draft-only edits by the owner; absent fields stay untouched.
    pub fn update_draft(
        &self,
        id: ProjectId,
        changes: ProjectChanges,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        let mut project = self.active_project(id)?;
        self.access
            .require_owning_professor(actor, project.professor_id)?;
        ensure_permitted(&project, ProjectAction::Edit)?;

        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(ProjectError::EmptyTitle);
            }
            project.title = title;
        }
        if let Some(department) = changes.department_id {
            project.department_id = department;
        }
        if let Some(scholarships) = changes.requested_scholarships {
            project.requested_scholarships = scholarships;
        }
        if let Some(volunteers) = changes.requested_volunteers {
            project.requested_volunteers = volunteers;
        }

        project.updated_at = now;
        self.projects.update(project.clone())?;
        Ok(project)
    }

    /// Soft-delete a draft; the row keeps its history but leaves every listing.
    pub fn delete_draft(
        &self,
        id: ProjectId,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<(), ProjectError> {
        let mut project = self.active_project(id)?;
        self.access
            .require_owning_professor(actor, project.professor_id)?;
        ensure_permitted(&project, ProjectAction::Delete)?;

        project.deleted_at = Some(now);
        project.updated_at = now;
        self.projects.update(project)?;
        info!(project = id.0, "project draft removed");
        Ok(())
    }

    /// Hand the draft in. Lands in SUBMITTED directly when a signature is
    /// already on file, otherwise parks at the signature stage.
    pub fn submit(
        &self,
        id: ProjectId,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        let mut project = self.active_project(id)?;
        self.access
            .require_owning_professor(actor, project.professor_id)?;
        ensure_permitted(&project, ProjectAction::Submit)?;
        if !project.is_complete() {
            return Err(ProjectError::Incomplete);
        }

        project.status = if project.professor_signature.is_some() {
            ProjectStatus::Submitted
        } else {
            ProjectStatus::PendingProfessorSignature
        };
        project.updated_at = now;
        self.projects.update(project.clone())?;
        info!(project = id.0, status = project.status.label(), "project submitted");
        Ok(project)
    }

    /// Attach the professor's signature and move to SUBMITTED; also the return
    /// path after an admin revision request.
    pub fn sign(
        &self,
        id: ProjectId,
        actor: Actor,
        signature: String,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        let mut project = self.active_project(id)?;
        self.access
            .require_owning_professor(actor, project.professor_id)?;
        ensure_permitted(&project, ProjectAction::Sign)?;
        if signature.trim().is_empty() {
            return Err(ProjectError::EmptySignature);
        }

        project.professor_signature = Some(signature);
        project.status = ProjectStatus::Submitted;
        project.updated_at = now;
        self.projects.update(project.clone())?;
        self.notify_admins(&project, NotificationKind::SignatureRecorded);
        Ok(project)
    }

    /// Stage the proposal for an admin counter-signature.
    pub fn require_admin_signature(
        &self,
        id: ProjectId,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        self.access.require_admin(actor)?;
        let mut project = self.active_project(id)?;
        ensure_permitted(&project, ProjectAction::RequireAdminSignature)?;

        project.status = ProjectStatus::PendingAdminSignature;
        project.updated_at = now;
        self.projects.update(project.clone())?;
        Ok(project)
    }

    /// Approve the proposal, granting the slot allocation.
    ///
    /// From the counter-signature stage the signed document is mandatory; the
    /// allocation defaults to the requested count when the admin omits it.
    pub fn approve(
        &self,
        id: ProjectId,
        actor: Actor,
        allocated_scholarships: Option<i64>,
        signed_document: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        self.access.require_admin(actor)?;
        let mut project = self.active_project(id)?;
        ensure_permitted(&project, ProjectAction::Approve)?;

        if project.status == ProjectStatus::PendingAdminSignature {
            let document = signed_document
                .filter(|document| !document.trim().is_empty())
                .ok_or(ProjectError::MissingSignedDocument)?;
            project.admin_signature = Some(document);
        }

        let proposed =
            allocated_scholarships.unwrap_or_else(|| i64::from(project.requested_scholarships));
        let granted = validate_allocation(project.requested_scholarships, proposed)?;

        project.allocated_scholarships = Some(granted);
        project.status = ProjectStatus::Approved;
        project.updated_at = now;
        self.projects.update(project.clone())?;
        info!(project = id.0, granted, "project approved");

        let allocation = granted.to_string();
        self.notify_professor(
            &project,
            NotificationKind::ProjectApproved,
            &[("allocated_scholarships", allocation)],
        );
        Ok(project)
    }

    /// Reject the proposal with the reason recorded as admin feedback.
    pub fn reject(
        &self,
        id: ProjectId,
        actor: Actor,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        self.access.require_admin(actor)?;
        let mut project = self.active_project(id)?;
        ensure_permitted(&project, ProjectAction::Reject)?;
        if reason.trim().is_empty() {
            return Err(ProjectError::EmptyReason);
        }

        project.admin_feedback = Some(reason.clone());
        project.status = ProjectStatus::Rejected;
        project.updated_at = now;
        self.projects.update(project.clone())?;
        info!(project = id.0, "project rejected");

        self.notify_professor(
            &project,
            NotificationKind::ProjectRejected,
            &[("reason", reason)],
        );
        Ok(project)
    }

    /// Send the proposal back for rework; the stale signature is dropped so
    /// the professor has to re-sign the revised version.
    pub fn request_revision(
        &self,
        id: ProjectId,
        actor: Actor,
        feedback: String,
        now: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        self.access.require_admin(actor)?;
        let mut project = self.active_project(id)?;
        ensure_permitted(&project, ProjectAction::RequestRevision)?;
        if feedback.trim().is_empty() {
            return Err(ProjectError::EmptyFeedback);
        }

        project.admin_feedback = Some(feedback.clone());
        project.professor_signature = None;
        project.status = ProjectStatus::PendingRevision;
        project.updated_at = now;
        self.projects.update(project.clone())?;

        self.notify_professor(
            &project,
            NotificationKind::RevisionRequested,
            &[("feedback", feedback)],
        );
        Ok(project)
    }

    /// Fetch for API responses, hiding soft-deleted rows.
    pub fn get(&self, id: ProjectId) -> Result<Project, ProjectError> {
        self.active_project(id)
    }

    fn active_project(&self, id: ProjectId) -> Result<Project, ProjectError> {
        self.projects
            .fetch(id)?
            .filter(|project| !project.is_deleted())
            .ok_or(ProjectError::NotFound)
    }

    fn notify_professor(&self, project: &Project, kind: NotificationKind, extra: &[(&str, String)]) {
        let Some(email) = self.directory.email_of(project.professor_id) else {
            warn!(
                professor = project.professor_id.0,
                kind = kind.label(),
                "no address on file, skipping notification"
            );
            return;
        };
        let event = project_event(project, email, kind, extra);
        if let Err(error) = self.notifier.send(&event) {
            warn!(error = %error, kind = kind.label(), "project notification failed");
        }
    }

    fn notify_admins(&self, project: &Project, kind: NotificationKind) {
        for email in self.directory.admin_emails() {
            let event = project_event(project, email, kind, &[]);
            if let Err(error) = self.notifier.send(&event) {
                warn!(error = %error, kind = kind.label(), "admin notification failed");
            }
        }
    }
}

fn ensure_permitted(project: &Project, action: ProjectAction) -> Result<(), ProjectError> {
    if project.status.permits(action) {
        Ok(())
    } else {
        Err(ProjectError::IllegalTransition {
            status: project.status,
            action,
        })
    }
}

fn project_event(
    project: &Project,
    recipient: String,
    kind: NotificationKind,
    extra: &[(&str, String)],
) -> NotificationEvent {
    let mut payload = BTreeMap::new();
    payload.insert("project_id".to_string(), project.id.0.to_string());
    payload.insert("project_title".to_string(), project.title.clone());
    for (key, value) in extra {
        payload.insert((*key).to_string(), value.clone());
    }
    NotificationEvent {
        application_id: None,
        recipient_email: recipient,
        kind,
        payload,
    }
}

/// Error raised by the project lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project title cannot be empty")]
    EmptyTitle,
    #[error(
        "academic year {year} is outside the supported range {min}..={max}",
        min = MIN_ACADEMIC_YEAR,
        max = MAX_ACADEMIC_YEAR
    )]
    UnsupportedYear { year: i32 },
    #[error("project not found")]
    NotFound,
    #[error("{action} is not legal while the project is {status}")]
    IllegalTransition {
        status: ProjectStatus,
        action: ProjectAction,
    },
    #[error("a submission needs a title and at least one requested slot")]
    Incomplete,
    #[error("signature cannot be empty")]
    EmptySignature,
    #[error("approval from the counter-signature stage needs the signed document")]
    MissingSignedDocument,
    #[error("a rejection needs a non-empty reason")]
    EmptyReason,
    #[error("a revision request needs non-empty feedback")]
    EmptyFeedback,
    #[error(transparent)]
    Allocation(#[from] AllocationViolation),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
