use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for people in any role (professors, students, admins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier wrapper for academic departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub u64);

/// Role carried by the acting user; authorization is decided from this plus ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Professor,
    Student,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::Professor => "professor",
            ActorRole::Student => "student",
        }
    }
}

/// The authenticated identity an operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub const fn admin(id: u64) -> Self {
        Self {
            id: UserId(id),
            role: ActorRole::Admin,
        }
    }

    pub const fn professor(id: u64) -> Self {
        Self {
            id: UserId(id),
            role: ActorRole::Professor,
        }
    }

    pub const fn student(id: u64) -> Self {
        Self {
            id: UserId(id),
            role: ActorRole::Student,
        }
    }
}

/// Academic term halves; labels follow the registry's wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "TERM_1")]
    First,
    #[serde(rename = "TERM_2")]
    Second,
}

impl Term {
    pub const fn label(self) -> &'static str {
        match self {
            Term::First => "TERM_1",
            Term::Second => "TERM_2",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A (year, term) pair identifying one offering cycle of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub year: i32,
    pub term: Term,
}

impl AcademicTerm {
    pub const fn new(year: i32, term: Term) -> Self {
        Self { year, term }
    }
}

impl fmt::Display for AcademicTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.term)
    }
}

pub const MIN_ACADEMIC_YEAR: i32 = 2000;
pub const MAX_ACADEMIC_YEAR: i32 = 2100;

/// Years the registry accepts, matching the enrollment form bounds.
pub const fn year_supported(year: i32) -> bool {
    year >= MIN_ACADEMIC_YEAR && year <= MAX_ACADEMIC_YEAR
}
