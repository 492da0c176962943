use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    Actor, Application, ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationView,
    NewApplication, Role, StudentId,
};
use super::eligibility::is_eligible;
use super::machine::{PlacementStateMachine, TransitionError, TransitionReport};
use super::store::{ApplicationStore, CompanyDirectory, StoreError, StudentDirectory};
use crate::workflows::placement::stats::{self, PlacementStats};

/// Orchestrator the HTTP layer calls: composes the eligibility gate, the
/// store, and the placement state machine, and enforces authorization
/// scoping server-side regardless of client-supplied filters.
pub struct ApplicationService<S, D, C> {
    store: Arc<S>,
    students: Arc<D>,
    companies: Arc<C>,
    machine: PlacementStateMachine<S, D>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Outcome of an update, carrying the cascade fan-out count when the
/// placement cascade ran.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub application: ApplicationView,
    pub rejected_siblings: usize,
}

impl<S, D, C> ApplicationService<S, D, C>
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    pub fn new(store: Arc<S>, students: Arc<D>, companies: Arc<C>) -> Self {
        let machine = PlacementStateMachine::new(store.clone(), students.clone());
        Self {
            store,
            students,
            companies,
            machine,
        }
    }

    /// Officers see every application; students only their own.
    pub fn list(&self, actor: &Actor) -> Result<Vec<ApplicationView>, ApplicationServiceError> {
        let mut applications = if actor.role.is_officer() {
            self.store.list_all()?
        } else {
            self.store
                .list_by_student(&StudentId(actor.id.clone()))?
        };
        applications.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));

        applications
            .into_iter()
            .map(|application| self.resolve_view(application))
            .collect()
    }

    pub fn get(
        &self,
        id: &ApplicationId,
        actor: &Actor,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let application = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;

        if !actor.role.is_officer() && !actor.owns_student(&application.student_id) {
            return Err(ApplicationServiceError::Forbidden);
        }

        self.resolve_view(application)
    }

    /// Create an application for the acting student. Rejects placed
    /// students, duplicate (student, company) pairs, and GPA-ineligible
    /// applicants before anything is written.
    pub fn create(
        &self,
        actor: &Actor,
        request: NewApplication,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        if actor.role != Role::Student {
            return Err(ApplicationServiceError::Forbidden);
        }

        let student_id = StudentId(actor.id.clone());
        let student = self
            .students
            .fetch(&student_id)?
            .ok_or(ApplicationServiceError::UnknownStudent)?;

        if student.is_placed {
            return Err(ApplicationServiceError::AlreadyPlaced);
        }

        let company = self
            .companies
            .fetch(&request.company_id)?
            .ok_or(StoreError::NotFound)?;

        // Fast-path duplicate check; the store's uniqueness rule remains the
        // arbiter when two creates race past this point.
        if self
            .store
            .find_by_student_company(&student_id, &company.id)?
            .is_some()
        {
            return Err(StoreError::Duplicate.into());
        }

        if !is_eligible(student.gpa, company.min_gpa) {
            return Err(ApplicationServiceError::Ineligible {
                required: company.min_gpa.unwrap_or(0.0),
                actual: student.gpa,
            });
        }

        let application = Application {
            id: next_application_id(),
            student_id: student.id.clone(),
            company_id: company.id.clone(),
            status: ApplicationStatus::Pending,
            applied_date: Utc::now(),
            resume_url: request.resume_url,
            cover_letter: request.cover_letter,
            remarks: None,
        };

        let stored = self.store.create(application)?;
        self.resolve_view(stored)
    }

    /// Apply a patch. A `status` change delegates to the state machine;
    /// everything else is a plain field update after ownership checks.
    pub fn update(
        &self,
        id: &ApplicationId,
        actor: &Actor,
        patch: ApplicationPatch,
    ) -> Result<UpdateReport, ApplicationServiceError> {
        let application = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;

        if !actor.role.is_officer() {
            if !actor.owns_student(&application.student_id) {
                return Err(ApplicationServiceError::Forbidden);
            }
            if patch.status.is_some() {
                return Err(ApplicationServiceError::Forbidden);
            }
            // Students own their snapshot fields only; remarks stay
            // officer-controlled and are dropped from the patch here.
            let stored = self.store.update(apply_student_fields(application, patch))?;
            return Ok(UpdateReport {
                application: self.resolve_view(stored)?,
                rejected_siblings: 0,
            });
        }

        if let Some(requested) = patch.status {
            let report = self
                .machine
                .transition(&application, requested, patch.remarks, actor)?;
            let (application, rejected_siblings) = match report {
                TransitionReport::Updated(application) => (application, 0),
                TransitionReport::Placed {
                    application,
                    rejected_siblings,
                } => (application, rejected_siblings),
            };
            return Ok(UpdateReport {
                application: self.resolve_view(application)?,
                rejected_siblings,
            });
        }

        let stored = self.store.update(apply_fields(application, patch))?;
        Ok(UpdateReport {
            application: self.resolve_view(stored)?,
            rejected_siblings: 0,
        })
    }

    pub fn delete(
        &self,
        id: &ApplicationId,
        actor: &Actor,
    ) -> Result<(), ApplicationServiceError> {
        let application = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;

        if !actor.role.is_officer() && !actor.owns_student(&application.student_id) {
            return Err(ApplicationServiceError::Forbidden);
        }

        self.store.delete(id)?;
        Ok(())
    }

    /// Role-scoped dashboard counters.
    pub fn stats(&self, actor: &Actor) -> Result<PlacementStats, ApplicationServiceError> {
        let now = Utc::now();
        let companies = self.companies.companies()?;

        if actor.role.is_officer() {
            let applications = self.store.list_all()?;
            let students = self.students.students()?;
            Ok(PlacementStats::Officer(stats::officer_stats(
                &applications,
                &students,
                &companies,
                now,
            )))
        } else {
            let applications = self
                .store
                .list_by_student(&StudentId(actor.id.clone()))?;
            Ok(PlacementStats::Student(stats::student_stats(
                &applications,
                &companies,
                now,
            )))
        }
    }

    fn resolve_view(
        &self,
        application: Application,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let student = self.students.fetch(&application.student_id)?;
        let company = self.companies.fetch(&application.company_id)?;
        Ok(ApplicationView::resolve(
            application,
            student.as_ref(),
            company.as_ref(),
        ))
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("not authorized")]
    Forbidden,
    #[error("student is already placed and cannot apply to other companies")]
    AlreadyPlaced,
    #[error("student GPA {actual:.2} is below the company minimum {required:.2}")]
    Ineligible { required: f64, actual: f64 },
    #[error("student record not found")]
    UnknownStudent,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn apply_student_fields(mut application: Application, patch: ApplicationPatch) -> Application {
    if let Some(resume_url) = patch.resume_url {
        application.resume_url = Some(resume_url);
    }
    if let Some(cover_letter) = patch.cover_letter {
        application.cover_letter = Some(cover_letter);
    }
    application
}

fn apply_fields(application: Application, patch: ApplicationPatch) -> Application {
    let remarks = patch.remarks.clone();
    let mut application = apply_student_fields(application, patch);
    if remarks.is_some() {
        application.remarks = remarks;
    }
    application
}
