//! Payroll deduction domain module.
//!
//! Business rules for building a deduction request: the employee and
//! affordability records consumed from collaborators, the closed set of
//! deduction types, and the `DeductionDraft` aggregate whose readiness guard
//! gates submission. Deterministic domain logic only (no IO, no async).

pub mod assessment;
pub mod deduction_type;
pub mod draft;
pub mod employee;
pub mod readiness;
pub mod request;

pub use assessment::{AffordabilityAssessment, AffordabilityVerdict, RiskLevel};
pub use deduction_type::DeductionType;
pub use draft::{
    AssessmentRequest, DeductionDraft, DraftCommand, DraftEdit, DraftError, DraftEvent,
    DraftSnapshot, DraftState, ValidatedDraft,
};
pub use employee::{Employee, EmploymentStatus};
pub use readiness::{DraftPolicy, ReadinessIssue, ReadinessReport};
pub use request::{DeductionRequest, DeductionRequestStatus, NewDeductionRequest};
