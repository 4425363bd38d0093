use crate::workflows::repository::RepositoryError;

use super::domain::{Period, PeriodId};

/// Storage boundary for enrollment windows.
pub trait PeriodRepository: Send + Sync {
    fn insert(&self, period: Period) -> Result<(), RepositoryError>;
    fn update(&self, period: Period) -> Result<(), RepositoryError>;
    fn remove(&self, id: PeriodId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError>;
    fn list(&self) -> Result<Vec<Period>, RepositoryError>;
}
