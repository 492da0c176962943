use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for application records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for student accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for company postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Role carried by an authenticated caller. Credential checks happen
/// upstream; the engine only consumes the already-resolved role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    PlacementOfficer,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "placement_officer" => Some(Role::PlacementOfficer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Officers and admins share the review/decision privileges.
    pub const fn is_officer(self) -> bool {
        matches!(self, Role::PlacementOfficer | Role::Admin)
    }
}

/// Already-authenticated caller identity supplied by the auth boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn owns_student(&self, student_id: &StudentId) -> bool {
        self.id == student_id.0
    }
}

/// Read-only snapshot of a student consumed by the engine. `is_placed` is
/// written exclusively through the placement cascade's linchpin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub register_number: Option<String>,
    pub department: Option<String>,
    pub gpa: f64,
    pub is_placed: bool,
}

/// Read-only snapshot of a company posting. A missing `min_gpa` means the
/// posting has no GPA requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub location: String,
    pub package_lpa: Option<f64>,
    pub min_gpa: Option<f64>,
    pub deadline: DateTime<Utc>,
}

/// Lifecycle status of an application.
///
/// `approved` is the only protected state: once a student holds an approved
/// application they are placed, and that record cannot be downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "under_review" => Some(ApplicationStatus::UnderReview),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// Statuses the exclusivity cascade force-rejects.
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::UnderReview
        )
    }
}

/// A student's request to be considered for a company's opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub company_id: CompanyId,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub remarks: Option<String>,
}

/// Payload accepted when a student applies to a posting. The student
/// identity comes from the actor, never from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub company_id: CompanyId,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Partial update applied through the service. `status` is officer-only.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub remarks: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Display-relevant student fields resolved into API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub register_number: Option<String>,
    pub department: Option<String>,
    pub is_placed: bool,
}

impl From<&StudentRecord> for StudentSummary {
    fn from(record: &StudentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            register_number: record.register_number.clone(),
            department: record.department.clone(),
            is_placed: record.is_placed,
        }
    }
}

/// Display-relevant company fields resolved into API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub id: CompanyId,
    pub name: String,
    pub location: String,
    pub package_lpa: Option<f64>,
    pub deadline: DateTime<Utc>,
}

impl From<&CompanyRecord> for CompanySummary {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            location: record.location.clone(),
            package_lpa: record.package_lpa,
            deadline: record.deadline,
        }
    }
}

/// Read model returned by the service: the application plus resolved
/// student/company display fields. The summaries are `None` when the
/// referenced record no longer exists in its directory.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub status: &'static str,
    pub applied_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ApplicationView {
    pub fn resolve(
        application: Application,
        student: Option<&StudentRecord>,
        company: Option<&CompanyRecord>,
    ) -> Self {
        Self {
            id: application.id,
            status: application.status.label(),
            applied_date: application.applied_date,
            student: student.map(StudentSummary::from),
            company: company.map(CompanySummary::from),
            resume_url: application.resume_url,
            cover_letter: application.cover_letter,
            remarks: application.remarks,
        }
    }
}
