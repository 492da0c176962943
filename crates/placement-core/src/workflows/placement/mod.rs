//! Placement workflow: application intake, officer review, and the
//! exclusivity cascade that finalizes a student's placement.

pub mod applications;
pub mod stats;
