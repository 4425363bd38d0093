//! Slot-allocation policy: pure bounds shared by project approval and later
//! administrative adjustment, plus the term-wide scholarship pool.

pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use policy::{validate_allocation, validate_pool, AllocationPolicy, AllocationViolation};
pub use router::allocation_router;
pub use service::{AllocationError, AllocationService};
