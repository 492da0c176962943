//! Core engine for the campus placement portal.
//!
//! The interesting machinery lives in [`workflows::placement::applications`]:
//! students apply to company postings, placement officers decide, and the
//! placement state machine enforces exclusivity: the moment one application
//! is approved, the student is marked placed and every other in-flight
//! application for that student is rejected in the same logical operation.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
