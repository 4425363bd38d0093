use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{AcademicTerm, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodId(pub u64);

/// Where an enrollment window sits relative to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodPhase {
    Future,
    Active,
    Closed,
}

impl PeriodPhase {
    pub const fn label(self) -> &'static str {
        match self {
            PeriodPhase::Future => "FUTURE",
            PeriodPhase::Active => "ACTIVE",
            PeriodPhase::Closed => "CLOSED",
        }
    }
}

/// Enrollment window during which students may apply for a term.
///
/// Dates are inclusive on both ends; `total_scholarships` is the optional
/// term-wide funding pool recorded by the coordination office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub year: i32,
    pub term: Term,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_scholarships: Option<u32>,
}

impl Period {
    pub fn academic_term(&self) -> AcademicTerm {
        AcademicTerm::new(self.year, self.term)
    }

    /// True when the other window touches this one anywhere.
    ///
    /// Covers the three arrangements that matter: the existing window
    /// straddles the new start, straddles the new end, or sits entirely
    /// inside the new range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        (self.start_date <= start && self.end_date >= start)
            || (self.start_date <= end && self.end_date >= end)
            || (self.start_date >= start && self.end_date <= end)
    }

    pub fn phase(&self, today: NaiveDate) -> PeriodPhase {
        if today < self.start_date {
            PeriodPhase::Future
        } else if today > self.end_date {
            PeriodPhase::Closed
        } else {
            PeriodPhase::Active
        }
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.phase(today) == PeriodPhase::Active
    }
}

/// Payload for opening a new enrollment window.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodDraft {
    pub year: i32,
    pub term: Term,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub total_scholarships: Option<u32>,
}

/// Partial update for an existing window; year and term never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodPatch {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_scholarships: Option<u32>,
}
