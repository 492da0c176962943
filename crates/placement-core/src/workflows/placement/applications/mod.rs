//! Application lifecycle and placement-exclusivity engine.
//!
//! Students apply to postings (GPA-gated, one application per company);
//! officers move applications through `pending -> under_review ->
//! approved/rejected`. Approving an application places the student and
//! force-rejects their other in-flight applications in one logical
//! operation, arbitrated by the `mark_placed` conditional write.

pub mod domain;
pub mod eligibility;
pub mod machine;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, Application, ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationView,
    CompanyId, CompanyRecord, CompanySummary, NewApplication, Role, StudentId, StudentRecord,
    StudentSummary,
};
pub use eligibility::is_eligible;
pub use machine::{PlacementStateMachine, TransitionError, TransitionReport};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError, UpdateReport};
pub use store::{ApplicationStore, CompanyDirectory, StoreError, StudentDirectory};
