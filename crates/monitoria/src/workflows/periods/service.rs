use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::workflows::access::{AccessError, AccessPolicy};
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::domain::{
    year_supported, AcademicTerm, Actor, Term, MAX_ACADEMIC_YEAR, MIN_ACADEMIC_YEAR,
};
use crate::workflows::repository::RepositoryError;

use super::domain::{Period, PeriodDraft, PeriodId, PeriodPatch};
use super::repository::PeriodRepository;

/// Service guarding the enrollment-window calendar.
pub struct PeriodService<P, A> {
    periods: Arc<P>,
    applications: Arc<A>,
    access: AccessPolicy,
}

static PERIOD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_period_id() -> PeriodId {
    PeriodId(PERIOD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<P, A> PeriodService<P, A>
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(periods: Arc<P>, applications: Arc<A>) -> Self {
        Self {
            periods,
            applications,
            access: AccessPolicy::default(),
        }
    }

    /// Open a new enrollment window after screening for calendar clashes.
    pub fn create_period(&self, draft: PeriodDraft, actor: Actor) -> Result<Period, PeriodError> {
        self.access.require_admin(actor)?;
        validate_window(draft.year, draft.start_date, draft.end_date)?;
        self.ensure_vacant(draft.year, draft.term, draft.start_date, draft.end_date, None)?;

        let period = Period {
            id: next_period_id(),
            year: draft.year,
            term: draft.term,
            start_date: draft.start_date,
            end_date: draft.end_date,
            total_scholarships: draft.total_scholarships,
        };
        self.periods.insert(period.clone())?;
        info!(
            period = period.id.0,
            term = %period.academic_term(),
            "enrollment period opened"
        );
        Ok(period)
    }

    /// Merge date or scholarship-pool changes into an existing window.
    ///
    /// Year and term are fixed at creation, so the merged window is re-checked
    /// against every other period of the same term.
    pub fn update_period(
        &self,
        id: PeriodId,
        patch: PeriodPatch,
        actor: Actor,
    ) -> Result<Period, PeriodError> {
        self.access.require_admin(actor)?;
        let mut period = self.periods.fetch(id)?.ok_or(PeriodError::NotFound)?;

        if let Some(start) = patch.start_date {
            period.start_date = start;
        }
        if let Some(end) = patch.end_date {
            period.end_date = end;
        }
        if let Some(total) = patch.total_scholarships {
            period.total_scholarships = Some(total);
        }

        validate_window(period.year, period.start_date, period.end_date)?;
        self.ensure_vacant(
            period.year,
            period.term,
            period.start_date,
            period.end_date,
            Some(id),
        )?;
        self.periods.update(period.clone())?;
        Ok(period)
    }

    /// Drop a window no application references.
    pub fn delete_period(&self, id: PeriodId, actor: Actor) -> Result<(), PeriodError> {
        self.access.require_admin(actor)?;
        let period = self.periods.fetch(id)?.ok_or(PeriodError::NotFound)?;
        if self.applications.any_for_term(period.academic_term())? {
            return Err(PeriodError::InUse {
                term: period.academic_term(),
            });
        }
        self.periods.remove(id)?;
        info!(period = id.0, "enrollment period removed");
        Ok(())
    }

    /// Earliest window open today, optionally narrowed to a year or term.
    pub fn active_period(
        &self,
        year: Option<i32>,
        term: Option<Term>,
        today: NaiveDate,
    ) -> Result<Option<Period>, PeriodError> {
        let mut candidates: Vec<Period> = self
            .periods
            .list()?
            .into_iter()
            .filter(|period| period.is_active(today))
            .filter(|period| year.map_or(true, |wanted| period.year == wanted))
            .filter(|period| term.map_or(true, |wanted| period.term == wanted))
            .collect();
        candidates.sort_by_key(|period| (period.year, period.term, period.start_date));
        Ok(candidates.into_iter().next())
    }

    fn ensure_vacant(
        &self,
        year: i32,
        term: Term,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<PeriodId>,
    ) -> Result<(), PeriodError> {
        let clash = self
            .periods
            .list()?
            .into_iter()
            .filter(|period| exclude.map_or(true, |skip| period.id != skip))
            .filter(|period| period.year == year && period.term == term)
            .any(|period| period.overlaps(start, end));
        if clash {
            return Err(PeriodError::Overlap {
                term: AcademicTerm::new(year, term),
            });
        }
        Ok(())
    }
}

fn validate_window(year: i32, start: NaiveDate, end: NaiveDate) -> Result<(), PeriodError> {
    if !year_supported(year) {
        return Err(PeriodError::UnsupportedYear { year });
    }
    if end <= start {
        return Err(PeriodError::EmptyWindow);
    }
    Ok(())
}

/// Error raised by the period registry.
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    #[error(
        "academic year {year} is outside the supported range {min}..={max}",
        min = MIN_ACADEMIC_YEAR,
        max = MAX_ACADEMIC_YEAR
    )]
    UnsupportedYear { year: i32 },
    #[error("end date must fall after the start date")]
    EmptyWindow,
    #[error("another enrollment window for {term} overlaps the requested range")]
    Overlap { term: AcademicTerm },
    #[error("enrollment period not found")]
    NotFound,
    #[error("applications already reference the {term} enrollment window")]
    InUse { term: AcademicTerm },
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
