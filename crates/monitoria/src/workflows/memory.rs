//! In-memory adapters backing the API runtime, the demo walkthrough, and the
//! test suites. A relational store slots in by implementing the same traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::applications::domain::{Application, ApplicationId, ApplicationStatus};
use super::applications::repository::{ApplicationRepository, PlannedTransition};
use super::domain::{AcademicTerm, UserId};
use super::notifications::{DeliveryError, NotificationEvent, Notifier, RecipientDirectory};
use super::periods::domain::{Period, PeriodId};
use super::periods::repository::PeriodRepository;
use super::projects::domain::{Project, ProjectId};
use super::projects::repository::ProjectRepository;
use super::repository::RepositoryError;

#[derive(Default, Clone)]
pub struct InMemoryPeriodStore {
    rows: Arc<Mutex<HashMap<PeriodId, Period>>>,
}

impl PeriodRepository for InMemoryPeriodStore {
    fn insert(&self, period: Period) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("period mutex poisoned");
        if guard.contains_key(&period.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(period.id, period);
        Ok(())
    }

    fn update(&self, period: Period) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("period mutex poisoned");
        if guard.contains_key(&period.id) {
            guard.insert(period.id, period);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn remove(&self, id: PeriodId) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("period mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError> {
        let guard = self.rows.lock().expect("period mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Period>, RepositoryError> {
        let guard = self.rows.lock().expect("period mutex poisoned");
        let mut rows: Vec<Period> = guard.values().cloned().collect();
        rows.sort_by_key(|period| period.id);
        Ok(rows)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryProjectStore {
    rows: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl ProjectRepository for InMemoryProjectStore {
    fn insert(&self, project: Project) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("project mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id, project);
        Ok(())
    }

    fn update(&self, project: Project) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("project mutex poisoned");
        if guard.contains_key(&project.id) {
            guard.insert(project.id, project);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.rows.lock().expect("project mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list_for_term(&self, term: AcademicTerm) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.rows.lock().expect("project mutex poisoned");
        let mut rows: Vec<Project> = guard
            .values()
            .filter(|project| project.academic_term() == term)
            .cloned()
            .collect();
        rows.sort_by_key(|project| project.id);
        Ok(rows)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryApplicationStore {
    rows: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationStore {
    fn insert(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application);
        Ok(())
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            guard.insert(application.id, application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.rows.lock().expect("application mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list_for_project(&self, project: ProjectId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.rows.lock().expect("application mutex poisoned");
        let mut rows: Vec<Application> = guard
            .values()
            .filter(|application| application.project_id == project)
            .cloned()
            .collect();
        rows.sort_by_key(|application| application.id);
        Ok(rows)
    }

    fn any_for_term(&self, term: AcademicTerm) -> Result<bool, RepositoryError> {
        let guard = self.rows.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .any(|application| application.academic_term() == term))
    }

    fn any_for_student_project(
        &self,
        student: UserId,
        project: ProjectId,
    ) -> Result<bool, RepositoryError> {
        let guard = self.rows.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .any(|application| application.student_id == student && application.project_id == project))
    }

    fn any_accepted_scholarship(
        &self,
        student: UserId,
        term: AcademicTerm,
    ) -> Result<bool, RepositoryError> {
        let guard = self.rows.lock().expect("application mutex poisoned");
        Ok(guard.values().any(|application| {
            application.student_id == student
                && application.academic_term() == term
                && application.status == ApplicationStatus::AcceptedScholarship
        }))
    }

    fn apply_plan(
        &self,
        transitions: &[PlannedTransition],
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("application mutex poisoned");
        // Check every expected prior status before the first write so the
        // whole plan lands or none of it does.
        for planned in transitions {
            let current = guard
                .get(&planned.application_id)
                .ok_or(RepositoryError::NotFound)?;
            if current.status != planned.from {
                return Err(RepositoryError::Conflict);
            }
        }
        for planned in transitions {
            if let Some(row) = guard.get_mut(&planned.application_id) {
                row.status = planned.to;
                row.updated_at = now;
            }
        }
        Ok(())
    }
}

/// Address book double; the production deployment resolves against the
/// account service instead.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    emails: Arc<Mutex<HashMap<UserId, String>>>,
    admins: Arc<Mutex<Vec<String>>>,
}

impl InMemoryDirectory {
    pub fn register(&self, user: UserId, email: &str) {
        self.emails
            .lock()
            .expect("directory mutex poisoned")
            .insert(user, email.to_string());
    }

    pub fn register_admin(&self, email: &str) {
        self.admins
            .lock()
            .expect("directory mutex poisoned")
            .push(email.to_string());
    }
}

impl RecipientDirectory for InMemoryDirectory {
    fn email_of(&self, user: UserId) -> Option<String> {
        self.emails
            .lock()
            .expect("directory mutex poisoned")
            .get(&user)
            .cloned()
    }

    fn admin_emails(&self) -> Vec<String> {
        self.admins.lock().expect("directory mutex poisoned").clone()
    }
}

/// Notifier double that keeps every event for assertions.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, event: &NotificationEvent) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}
