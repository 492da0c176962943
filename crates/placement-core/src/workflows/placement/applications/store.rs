use super::domain::{
    Application, ApplicationId, ApplicationStatus, CompanyId, CompanyRecord, StudentId,
    StudentRecord,
};

/// Persistence abstraction for application records so the engine can be
/// exercised against an in-memory double in tests.
///
/// Implementations must uphold the pair-uniqueness rule: at most one record
/// per (student, company), with `create` reporting `Duplicate` rather than
/// overwriting.
pub trait ApplicationStore: Send + Sync {
    fn create(&self, application: Application) -> Result<Application, StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn find_by_student_company(
        &self,
        student_id: &StudentId,
        company_id: &CompanyId,
    ) -> Result<Option<Application>, StoreError>;
    fn list_all(&self) -> Result<Vec<Application>, StoreError>;
    fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Application>, StoreError>;
    /// Whole-record put for non-status field patches. `NotFound` if absent.
    fn update(&self, application: Application) -> Result<Application, StoreError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        remarks: Option<String>,
    ) -> Result<Application, StoreError>;
    /// Transitions every pending/under_review application of `student_id`
    /// other than `exclude` into rejected, returning how many changed.
    /// Must be atomic with respect to concurrent creates for the student.
    fn reject_open_siblings(
        &self,
        student_id: &StudentId,
        exclude: &ApplicationId,
    ) -> Result<usize, StoreError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError>;
}

/// Read access to student accounts, plus the single `is_placed` writer.
pub trait StudentDirectory: Send + Sync {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, StoreError>;
    fn students(&self) -> Result<Vec<StudentRecord>, StoreError>;
    /// Linchpin write for the approval cascade: sets `is_placed` true only
    /// if it is currently false. Returns whether this call flipped it;
    /// `false` means a concurrent approval already placed the student.
    fn mark_placed(&self, id: &StudentId) -> Result<bool, StoreError>;
}

/// Read access to company postings.
pub trait CompanyDirectory: Send + Sync {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, StoreError>;
    fn companies(&self) -> Result<Vec<CompanyRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an application for this student and company already exists")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
