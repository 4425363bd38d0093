use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::workflows::access::{AccessError, AccessPolicy};
use crate::workflows::domain::{AcademicTerm, Actor};
use crate::workflows::periods::domain::Period;
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ScoreBreakdown, SlotPreference,
};
use super::evaluation::{self, EvaluationWeights};
use super::repository::ApplicationRepository;

/// Intake and grading of student candidacies.
pub struct ApplicationService<P, J, A> {
    periods: Arc<P>,
    projects: Arc<J>,
    applications: Arc<A>,
    weights: EvaluationWeights,
    access: AccessPolicy,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<P, J, A> ApplicationService<P, J, A>
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(periods: Arc<P>, projects: Arc<J>, applications: Arc<A>) -> Self {
        Self {
            periods,
            projects,
            applications,
            weights: EvaluationWeights::default(),
            access: AccessPolicy::default(),
        }
    }

    pub fn with_weights(mut self, weights: EvaluationWeights) -> Self {
        self.weights = weights;
        self
    }

    /// File a candidacy for an approved project while its window is open.
    pub fn submit_application(
        &self,
        project_id: ProjectId,
        actor: Actor,
        desired_slot: SlotPreference,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        self.access.require_student(actor)?;
        let project = self.project(project_id)?;
        if project.status != ProjectStatus::Approved {
            return Err(ApplicationError::ProjectNotApproved {
                status: project.status,
            });
        }

        let period = self
            .active_window(&project, today)?
            .ok_or(ApplicationError::PeriodClosed {
                term: project.academic_term(),
            })?;

        if self
            .applications
            .any_for_student_project(actor.id, project.id)?
        {
            return Err(ApplicationError::Duplicate);
        }
        ensure_slot_open(&project, desired_slot)?;

        let application = Application {
            id: next_application_id(),
            project_id: project.id,
            student_id: actor.id,
            period_id: period.id,
            year: project.year,
            term: project.term,
            desired_slot,
            status: ApplicationStatus::Submitted,
            final_score: None,
            scores: None,
            professor_feedback: None,
            updated_at: now,
        };
        self.applications.insert(application.clone())?;
        info!(
            application = application.id.0,
            project = project.id.0,
            student = actor.id.0,
            slot = desired_slot.label(),
            "application submitted"
        );
        Ok(application)
    }

    /// Store the owner's final grade; the status stays put so grading can
    /// happen piecemeal ahead of the selection round.
    pub fn record_evaluation(
        &self,
        application_id: ApplicationId,
        actor: Actor,
        final_score: f64,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        if !evaluation::grade_in_scale(final_score) {
            return Err(ApplicationError::GradeOutOfScale { value: final_score });
        }
        self.grade(application_id, actor, final_score, None, feedback, now)
    }

    /// Collapse component marks through the rubric, then store the result.
    pub fn record_component_evaluation(
        &self,
        application_id: ApplicationId,
        actor: Actor,
        scores: ScoreBreakdown,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        for value in [
            scores.discipline_grade,
            scores.selection_grade,
            scores.academic_index,
        ] {
            if !evaluation::grade_in_scale(value) {
                return Err(ApplicationError::GradeOutOfScale { value });
            }
        }
        let final_score = evaluation::weighted_final(&scores, &self.weights);
        self.grade(
            application_id,
            actor,
            final_score,
            Some(scores),
            feedback,
            now,
        )
    }

    /// The applicant answers an open offer.
    pub fn respond_to_offer(
        &self,
        application_id: ApplicationId,
        actor: Actor,
        accept: bool,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        let mut application = self.existing(application_id)?;
        self.access
            .require_applicant(actor, application.student_id)?;

        let outcome =
            application
                .status
                .response_outcome(accept)
                .ok_or(ApplicationError::InvalidState {
                    status: application.status,
                })?;

        if outcome == ApplicationStatus::AcceptedScholarship
            && self
                .applications
                .any_accepted_scholarship(application.student_id, application.academic_term())?
        {
            return Err(ApplicationError::ScholarshipHeld {
                term: application.academic_term(),
            });
        }

        application.status = outcome;
        application.updated_at = now;
        self.applications.update(application.clone())?;
        info!(
            application = application.id.0,
            status = outcome.label(),
            "offer response recorded"
        );
        Ok(application)
    }

    /// Fetch one application.
    pub fn get(&self, id: ApplicationId) -> Result<Application, ApplicationError> {
        self.existing(id)
    }

    fn grade(
        &self,
        application_id: ApplicationId,
        actor: Actor,
        final_score: f64,
        scores: Option<ScoreBreakdown>,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        let mut application = self.existing(application_id)?;
        let project = self.project(application.project_id)?;
        self.access
            .require_owning_professor(actor, project.professor_id)?;
        if application.status != ApplicationStatus::Submitted {
            return Err(ApplicationError::InvalidState {
                status: application.status,
            });
        }

        application.final_score = Some(final_score);
        if scores.is_some() {
            application.scores = scores;
        }
        if let Some(feedback) = feedback {
            application.professor_feedback = Some(feedback);
        }
        application.updated_at = now;
        self.applications.update(application.clone())?;
        info!(
            application = application.id.0,
            final_score, "evaluation recorded"
        );
        Ok(application)
    }

    fn existing(&self, id: ApplicationId) -> Result<Application, ApplicationError> {
        self.applications
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)
    }

    fn project(&self, id: ProjectId) -> Result<Project, ApplicationError> {
        self.projects
            .fetch(id)?
            .filter(|project| !project.is_deleted())
            .ok_or(ApplicationError::ProjectNotFound)
    }

    /// Earliest enrollment window open today for the project's term, if any.
    fn active_window(
        &self,
        project: &Project,
        today: NaiveDate,
    ) -> Result<Option<Period>, ApplicationError> {
        let mut windows: Vec<Period> = self
            .periods
            .list()?
            .into_iter()
            .filter(|period| {
                period.year == project.year
                    && period.term == project.term
                    && period.is_active(today)
            })
            .collect();
        windows.sort_by_key(|period| period.start_date);
        Ok(windows.into_iter().next())
    }
}

fn ensure_slot_open(project: &Project, desired: SlotPreference) -> Result<(), ApplicationError> {
    let scholarships = project.allocated_scholarships.unwrap_or(0);
    let volunteers = project.requested_volunteers;
    let open = match desired {
        SlotPreference::Scholarship => scholarships > 0,
        SlotPreference::Volunteer => volunteers > 0,
        SlotPreference::Any => scholarships > 0 || volunteers > 0,
    };
    if open {
        Ok(())
    } else {
        Err(ApplicationError::SlotUnavailable { desired })
    }
}

/// Failures surfaced by the application lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("project does not exist")]
    ProjectNotFound,
    #[error("project is {status}, only approved projects take applications")]
    ProjectNotApproved { status: ProjectStatus },
    #[error("no active enrollment period for {term}")]
    PeriodClosed { term: AcademicTerm },
    #[error("student already applied to this project")]
    Duplicate,
    #[error("no {desired} slot is open on this project")]
    SlotUnavailable { desired: SlotPreference },
    #[error("grade {value} is outside the 0..=10 scale")]
    GradeOutOfScale { value: f64 },
    #[error("application does not exist")]
    NotFound,
    #[error("application is {status}")]
    InvalidState { status: ApplicationStatus },
    #[error("student already holds an accepted scholarship in {term}")]
    ScholarshipHeld { term: AcademicTerm },
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
