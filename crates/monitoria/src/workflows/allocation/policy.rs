use serde::{Deserialize, Serialize};

use crate::config::ProgramConfig;
use crate::workflows::domain::{AcademicTerm, ActorRole};

/// Slot-arithmetic knobs, loaded from `ProgramConfig` at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    pub volunteer_ceiling: u32,
}

impl AllocationPolicy {
    pub const fn new(volunteer_ceiling: u32) -> Self {
        Self { volunteer_ceiling }
    }

    /// Volunteer adjustments must be non-negative; professors additionally
    /// stay under the program ceiling, admins are unbounded.
    pub fn validate_volunteer_adjustment(
        &self,
        role: ActorRole,
        proposed: i64,
    ) -> Result<u32, AllocationViolation> {
        if proposed < 0 {
            return Err(AllocationViolation::Negative { proposed });
        }
        if role == ActorRole::Professor && proposed > i64::from(self.volunteer_ceiling) {
            return Err(AllocationViolation::ExceedsCeiling {
                proposed,
                ceiling: self.volunteer_ceiling,
            });
        }
        u32::try_from(proposed).map_err(|_| AllocationViolation::OutOfRange { proposed })
    }
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self::new(ProgramConfig::DEFAULT_VOLUNTEER_CEILING)
    }
}

/// Violations raised by the pure slot checks.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocationViolation {
    #[error("slot counts cannot be negative, got {proposed}")]
    Negative { proposed: i64 },
    #[error("slot count {proposed} is out of range")]
    OutOfRange { proposed: i64 },
    #[error("allocation {proposed} exceeds the {requested} scholarships the project requested")]
    ExceedsRequested { proposed: i64, requested: u32 },
    #[error("volunteer count {proposed} exceeds the program ceiling of {ceiling}")]
    ExceedsCeiling { proposed: i64, ceiling: u32 },
    #[error("scholarship pool of {limit} for {term} exceeded by {excess}")]
    PoolExceeded {
        term: AcademicTerm,
        limit: u32,
        excess: u32,
    },
}

/// A granted scholarship count never goes negative and never exceeds what the
/// project asked for. Inputs arrive signed because they come off the wire.
pub fn validate_allocation(requested: u32, proposed: i64) -> Result<u32, AllocationViolation> {
    if proposed < 0 {
        return Err(AllocationViolation::Negative { proposed });
    }
    if proposed > i64::from(requested) {
        return Err(AllocationViolation::ExceedsRequested {
            proposed,
            requested,
        });
    }
    Ok(proposed as u32)
}

/// The allocated scholarships of a whole term must fit the funding pool the
/// coordination office recorded on the period.
pub fn validate_pool(
    term: AcademicTerm,
    limit: u32,
    committed: u32,
    proposed_total: u32,
) -> Result<(), AllocationViolation> {
    let total = committed.saturating_add(proposed_total);
    if total > limit {
        return Err(AllocationViolation::PoolExceeded {
            term,
            limit,
            excess: total - limit,
        });
    }
    Ok(())
}
