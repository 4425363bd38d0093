use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{AcademicTerm, DepartmentId, Term, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub u64);

/// Lifecycle states of a teaching-assistantship project proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Draft,
    PendingProfessorSignature,
    Submitted,
    PendingAdminSignature,
    PendingRevision,
    Approved,
    Rejected,
}

/// Everything a caller can ask the lifecycle to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Submit,
    Sign,
    RequireAdminSignature,
    Approve,
    Reject,
    RequestRevision,
    Edit,
    Delete,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "DRAFT",
            ProjectStatus::PendingProfessorSignature => "PENDING_PROFESSOR_SIGNATURE",
            ProjectStatus::Submitted => "SUBMITTED",
            ProjectStatus::PendingAdminSignature => "PENDING_ADMIN_SIGNATURE",
            ProjectStatus::PendingRevision => "PENDING_REVISION",
            ProjectStatus::Approved => "APPROVED",
            ProjectStatus::Rejected => "REJECTED",
        }
    }

    /// Closed legality table for the whole lifecycle.
    ///
    /// Approval is reachable from both SUBMITTED and PENDING_ADMIN_SIGNATURE;
    /// the terminal states permit nothing.
    pub const fn permits(self, action: ProjectAction) -> bool {
        matches!(
            (self, action),
            (
                ProjectStatus::Draft,
                ProjectAction::Submit | ProjectAction::Edit | ProjectAction::Delete
            ) | (ProjectStatus::PendingProfessorSignature, ProjectAction::Sign)
                | (ProjectStatus::PendingRevision, ProjectAction::Sign)
                | (
                    ProjectStatus::Submitted,
                    ProjectAction::RequireAdminSignature
                        | ProjectAction::Approve
                        | ProjectAction::Reject
                        | ProjectAction::RequestRevision
                )
                | (ProjectStatus::PendingAdminSignature, ProjectAction::Approve)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Approved | ProjectStatus::Rejected)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ProjectAction {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectAction::Submit => "submit",
            ProjectAction::Sign => "sign",
            ProjectAction::RequireAdminSignature => "require_admin_signature",
            ProjectAction::Approve => "approve",
            ProjectAction::Reject => "reject",
            ProjectAction::RequestRevision => "request_revision",
            ProjectAction::Edit => "edit",
            ProjectAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ProjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A professor's proposal for assistantship slots in one academic term.
///
/// Admins only ever touch the allocation, feedback, and signature fields;
/// everything else belongs to the owning professor while the project is a
/// draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub professor_id: UserId,
    pub department_id: DepartmentId,
    pub year: i32,
    pub term: Term,
    pub requested_scholarships: u32,
    pub requested_volunteers: u32,
    pub allocated_scholarships: Option<u32>,
    pub status: ProjectStatus,
    pub professor_signature: Option<String>,
    pub admin_signature: Option<String>,
    pub admin_feedback: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn academic_term(&self) -> AcademicTerm {
        AcademicTerm::new(self.year, self.term)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Submission readiness: a title and at least one slot of either kind.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && (self.requested_scholarships > 0 || self.requested_volunteers > 0)
    }
}

/// Payload for opening a new proposal; the owner comes from the acting user.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub department_id: DepartmentId,
    pub year: i32,
    pub term: Term,
    pub requested_scholarships: u32,
    pub requested_volunteers: u32,
}

/// Draft-only edits; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub requested_scholarships: Option<u32>,
    #[serde(default)]
    pub requested_volunteers: Option<u32>,
}
