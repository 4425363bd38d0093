pub mod access;
pub mod allocation;
pub mod applications;
pub mod domain;
pub mod memory;
pub mod notifications;
pub mod periods;
pub mod projects;
pub mod repository;
pub mod selection;

pub use allocation::{allocation_router, AllocationError, AllocationService};
pub use applications::{application_router, ApplicationError, ApplicationService};
pub use periods::{period_router, PeriodError, PeriodService};
pub use projects::{project_router, ProjectError, ProjectService};
pub use selection::{selection_router, SelectionError, SelectionService};
