use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{AcademicTerm, Term, UserId};
use crate::workflows::periods::domain::PeriodId;
use crate::workflows::projects::domain::ProjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

/// Student-facing states; SUBMITTED is the only non-final one before a
/// selection round, and the SELECTED pair waits on the student's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Submitted,
    SelectedScholarship,
    SelectedVolunteer,
    AcceptedScholarship,
    AcceptedVolunteer,
    RejectedByProfessor,
    RejectedByStudent,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::SelectedScholarship => "SELECTED_SCHOLARSHIP",
            ApplicationStatus::SelectedVolunteer => "SELECTED_VOLUNTEER",
            ApplicationStatus::AcceptedScholarship => "ACCEPTED_SCHOLARSHIP",
            ApplicationStatus::AcceptedVolunteer => "ACCEPTED_VOLUNTEER",
            ApplicationStatus::RejectedByProfessor => "REJECTED_BY_PROFESSOR",
            ApplicationStatus::RejectedByStudent => "REJECTED_BY_STUDENT",
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, ApplicationStatus::Submitted)
    }

    /// An offer is on the table and only the student can move it.
    pub const fn awaiting_response(self) -> bool {
        matches!(
            self,
            ApplicationStatus::SelectedScholarship | ApplicationStatus::SelectedVolunteer
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::AcceptedScholarship
                | ApplicationStatus::AcceptedVolunteer
                | ApplicationStatus::RejectedByProfessor
                | ApplicationStatus::RejectedByStudent
        )
    }

    /// Where a student answer lands, or `None` when no offer is open.
    pub const fn response_outcome(self, accept: bool) -> Option<ApplicationStatus> {
        match (self, accept) {
            (ApplicationStatus::SelectedScholarship, true) => {
                Some(ApplicationStatus::AcceptedScholarship)
            }
            (ApplicationStatus::SelectedVolunteer, true) => {
                Some(ApplicationStatus::AcceptedVolunteer)
            }
            (
                ApplicationStatus::SelectedScholarship | ApplicationStatus::SelectedVolunteer,
                false,
            ) => Some(ApplicationStatus::RejectedByStudent),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the student asked for when applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotPreference {
    Scholarship,
    Volunteer,
    Any,
}

impl SlotPreference {
    pub const fn label(self) -> &'static str {
        match self {
            SlotPreference::Scholarship => "SCHOLARSHIP",
            SlotPreference::Volunteer => "VOLUNTEER",
            SlotPreference::Any => "ANY",
        }
    }

    pub const fn allows(self, kind: SlotKind) -> bool {
        matches!(
            (self, kind),
            (SlotPreference::Scholarship, SlotKind::Scholarship)
                | (SlotPreference::Volunteer, SlotKind::Volunteer)
                | (SlotPreference::Any, _)
        )
    }
}

impl fmt::Display for SlotPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Concrete slot assigned by a selection; never `ANY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotKind {
    Scholarship,
    Volunteer,
}

impl SlotKind {
    pub const fn label(self) -> &'static str {
        match self {
            SlotKind::Scholarship => "SCHOLARSHIP",
            SlotKind::Volunteer => "VOLUNTEER",
        }
    }

    pub const fn selected_status(self) -> ApplicationStatus {
        match self {
            SlotKind::Scholarship => ApplicationStatus::SelectedScholarship,
            SlotKind::Volunteer => ApplicationStatus::SelectedVolunteer,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Component marks a professor can record instead of a single final grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub discipline_grade: f64,
    pub selection_grade: f64,
    pub academic_index: f64,
}

/// One student's candidacy for one project's selection round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub project_id: ProjectId,
    pub student_id: UserId,
    pub period_id: PeriodId,
    pub year: i32,
    pub term: Term,
    pub desired_slot: SlotPreference,
    pub status: ApplicationStatus,
    pub final_score: Option<f64>,
    pub scores: Option<ScoreBreakdown>,
    pub professor_feedback: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn academic_term(&self) -> AcademicTerm {
        AcademicTerm::new(self.year, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offers_map_to_matching_acceptance() {
        assert_eq!(
            ApplicationStatus::SelectedScholarship.response_outcome(true),
            Some(ApplicationStatus::AcceptedScholarship)
        );
        assert_eq!(
            ApplicationStatus::SelectedVolunteer.response_outcome(true),
            Some(ApplicationStatus::AcceptedVolunteer)
        );
        assert_eq!(
            ApplicationStatus::SelectedScholarship.response_outcome(false),
            Some(ApplicationStatus::RejectedByStudent)
        );
    }

    #[test]
    fn only_open_offers_take_a_response() {
        assert_eq!(ApplicationStatus::Submitted.response_outcome(true), None);
        assert_eq!(
            ApplicationStatus::RejectedByProfessor.response_outcome(false),
            None
        );
        assert_eq!(
            ApplicationStatus::AcceptedScholarship.response_outcome(true),
            None
        );
    }

    #[test]
    fn preference_gates_slot_kinds() {
        assert!(SlotPreference::Scholarship.allows(SlotKind::Scholarship));
        assert!(!SlotPreference::Scholarship.allows(SlotKind::Volunteer));
        assert!(SlotPreference::Volunteer.allows(SlotKind::Volunteer));
        assert!(!SlotPreference::Volunteer.allows(SlotKind::Scholarship));
        assert!(SlotPreference::Any.allows(SlotKind::Scholarship));
        assert!(SlotPreference::Any.allows(SlotKind::Volunteer));
    }

    #[test]
    fn status_buckets_partition_the_lifecycle() {
        let statuses = [
            ApplicationStatus::Submitted,
            ApplicationStatus::SelectedScholarship,
            ApplicationStatus::SelectedVolunteer,
            ApplicationStatus::AcceptedScholarship,
            ApplicationStatus::AcceptedVolunteer,
            ApplicationStatus::RejectedByProfessor,
            ApplicationStatus::RejectedByStudent,
        ];
        for status in statuses {
            let buckets = [
                status.is_pending(),
                status.awaiting_response(),
                status.is_terminal(),
            ];
            assert_eq!(
                buckets.iter().filter(|hit| **hit).count(),
                1,
                "{status} must land in exactly one bucket"
            );
        }
    }
}
