//! Placement statistics read model backing the dashboard endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::applications::domain::{Application, ApplicationStatus, CompanyRecord, StudentRecord};

/// Role-scoped statistics payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlacementStats {
    Student(StudentStats),
    Officer(OfficerStats),
}

/// What a student sees: their own funnel plus open postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStats {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub rejected_applications: usize,
    pub active_companies: usize,
}

/// What officers and admins see across the whole drive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficerStats {
    pub total_companies: usize,
    pub active_companies: usize,
    pub total_students: usize,
    pub placed_students: usize,
    pub total_applications: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub placement_rate: f64,
}

fn count_status(applications: &[Application], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.status == status).count()
}

fn active_companies(companies: &[CompanyRecord], now: DateTime<Utc>) -> usize {
    companies.iter().filter(|c| c.deadline >= now).count()
}

/// Funnel counts over one student's applications.
pub fn student_stats(
    applications: &[Application],
    companies: &[CompanyRecord],
    now: DateTime<Utc>,
) -> StudentStats {
    StudentStats {
        total_applications: applications.len(),
        pending_applications: count_status(applications, ApplicationStatus::Pending),
        approved_applications: count_status(applications, ApplicationStatus::Approved),
        rejected_applications: count_status(applications, ApplicationStatus::Rejected),
        active_companies: active_companies(companies, now),
    }
}

/// Drive-wide counts plus the placement rate as a percentage rounded to two
/// decimals.
pub fn officer_stats(
    applications: &[Application],
    students: &[StudentRecord],
    companies: &[CompanyRecord],
    now: DateTime<Utc>,
) -> OfficerStats {
    let total_students = students.len();
    let placed_students = students.iter().filter(|s| s.is_placed).count();
    let placement_rate = if total_students > 0 {
        ((placed_students as f64 / total_students as f64) * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    OfficerStats {
        total_companies: companies.len(),
        active_companies: active_companies(companies, now),
        total_students,
        placed_students,
        total_applications: applications.len(),
        pending_applications: count_status(applications, ApplicationStatus::Pending),
        approved_applications: count_status(applications, ApplicationStatus::Approved),
        placement_rate,
    }
}
