use std::sync::Arc;

use super::domain::{Actor, Application, ApplicationStatus, StudentRecord};
use super::store::{ApplicationStore, StoreError, StudentDirectory};

/// Owns the application status lifecycle and the cross-application side
/// effects triggered by acceptance.
///
/// Status changes are officer-driven free transitions among the four
/// values, with two exceptions: transitioning *into* `approved` runs the
/// exclusivity cascade, and a placed student's `approved` record can never
/// be moved away from `approved`.
pub struct PlacementStateMachine<S, D> {
    store: Arc<S>,
    students: Arc<D>,
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionReport {
    /// Plain status change persisted with no side effects.
    Updated(Application),
    /// The approval cascade ran: the application is approved, the student is
    /// placed, and `rejected_siblings` open applications were force-rejected.
    Placed {
        application: Application,
        rejected_siblings: usize,
    },
}

impl TransitionReport {
    pub fn into_application(self) -> Application {
        match self {
            TransitionReport::Updated(application) => application,
            TransitionReport::Placed { application, .. } => application,
        }
    }
}

/// Error enumeration for rejected or failed transitions.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("only placement officers may change application status")]
    Forbidden,
    #[error("approved placements cannot be downgraded")]
    PlacementLocked,
    #[error("student was placed by a concurrent approval")]
    ConcurrencyConflict,
    #[error("student record missing for application")]
    UnknownStudent,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S, D> PlacementStateMachine<S, D>
where
    S: ApplicationStore,
    D: StudentDirectory,
{
    pub fn new(store: Arc<S>, students: Arc<D>) -> Self {
        Self { store, students }
    }

    /// Validate and apply a requested status change on behalf of `actor`.
    pub fn transition(
        &self,
        application: &Application,
        requested: ApplicationStatus,
        remarks: Option<String>,
        actor: &Actor,
    ) -> Result<TransitionReport, TransitionError> {
        if !actor.role.is_officer() {
            return Err(TransitionError::Forbidden);
        }

        let student = self
            .students
            .fetch(&application.student_id)?
            .ok_or(TransitionError::UnknownStudent)?;

        if student.is_placed
            && application.status == ApplicationStatus::Approved
            && requested != ApplicationStatus::Approved
        {
            return Err(TransitionError::PlacementLocked);
        }

        if requested == ApplicationStatus::Approved
            && application.status != ApplicationStatus::Approved
        {
            return self.approve_and_cascade(application, &student, remarks);
        }

        // Free transition, including the idempotent re-approve of an
        // already-approved record.
        let updated = self.store.update_status(&application.id, requested, remarks)?;
        Ok(TransitionReport::Updated(updated))
    }

    /// The three-way write behind placement exclusivity, made effectively
    /// atomic by the `mark_placed` linchpin: the status change and sibling
    /// sweep only run once the conditional flip of `is_placed` succeeds.
    /// Re-running after a crash between linchpin and sweep is safe: the
    /// re-check aborts before touching anything.
    pub fn approve_and_cascade(
        &self,
        application: &Application,
        student: &StudentRecord,
        remarks: Option<String>,
    ) -> Result<TransitionReport, TransitionError> {
        if student.is_placed {
            return Err(TransitionError::ConcurrencyConflict);
        }

        if !self.students.mark_placed(&application.student_id)? {
            // Lost the race to a concurrent approval; nothing was written.
            return Err(TransitionError::ConcurrencyConflict);
        }

        let approved =
            self.store
                .update_status(&application.id, ApplicationStatus::Approved, remarks)?;
        let rejected_siblings = self
            .store
            .reject_open_siblings(&application.student_id, &application.id)?;

        Ok(TransitionReport::Placed {
            application: approved,
            rejected_siblings,
        })
    }
}
