//! GPA gate deciding whether a student may apply to a posting.

/// True iff the student's GPA meets the posting's minimum. A posting with no
/// minimum admits everyone. Advisory on listing pages; `create` also uses it
/// as the server-side enforcement point.
pub fn is_eligible(student_gpa: f64, company_min_gpa: Option<f64>) -> bool {
    student_gpa >= company_min_gpa.unwrap_or(0.0)
}
