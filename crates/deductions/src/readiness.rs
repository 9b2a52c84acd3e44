//! Readiness guard: the single rule deciding whether a draft may be submitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_schedule::compute_maturity_total;

use crate::draft::DeductionDraft;

/// How strictly affordability gates submission for a given wizard.
///
/// A present assessment that says the employee cannot afford the amount always
/// blocks. Whether a *missing* assessment blocks depends on the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftPolicy {
    pub require_affordability: bool,
}

impl DraftPolicy {
    /// Deduction-request wizard: assessment optional.
    pub fn request_flow() -> Self {
        Self {
            require_affordability: false,
        }
    }

    /// Affordability-check wizard: an affordable assessment is mandatory.
    pub fn affordability_check_flow() -> Self {
        Self {
            require_affordability: true,
        }
    }

    pub fn evaluate(&self, draft: &DeductionDraft) -> ReadinessReport {
        let mut issues = Vec::new();

        if draft.employee_id().is_none() {
            issues.push(ReadinessIssue::EmployeeMissing);
        }
        if !draft.deduction_type().is_selected() {
            issues.push(ReadinessIssue::DeductionTypeUnselected);
        }
        match draft.amount() {
            None => issues.push(ReadinessIssue::AmountMissing),
            Some(amount) if amount <= Decimal::ZERO => {
                issues.push(ReadinessIssue::AmountNotPositive)
            }
            Some(amount)
                if draft
                    .number_of_installments()
                    .is_some_and(|months| compute_maturity_total(amount, months).is_none()) =>
            {
                issues.push(ReadinessIssue::AmountTooLarge)
            }
            Some(_) => {}
        }
        if draft.reason().trim().is_empty() {
            issues.push(ReadinessIssue::ReasonMissing);
        }
        if draft.start_date().is_none() {
            issues.push(ReadinessIssue::StartDateMissing);
        }
        if draft.number_of_installments().is_none() {
            issues.push(ReadinessIssue::InstallmentsMissing);
        }
        match draft.affordability() {
            Some(assessment) if !assessment.can_afford => {
                issues.push(ReadinessIssue::AffordabilityAdverse)
            }
            None if self.require_affordability => issues.push(ReadinessIssue::AffordabilityMissing),
            _ => {}
        }

        ReadinessReport { issues }
    }
}

/// One unmet submission requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessIssue {
    EmployeeMissing,
    DeductionTypeUnselected,
    AmountMissing,
    AmountNotPositive,
    /// Amount times installments does not fit the money type.
    AmountTooLarge,
    ReasonMissing,
    StartDateMissing,
    InstallmentsMissing,
    AffordabilityMissing,
    AffordabilityAdverse,
}

impl ReadinessIssue {
    /// Form field the issue belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ReadinessIssue::EmployeeMissing => "employee_id",
            ReadinessIssue::DeductionTypeUnselected => "deduction_type",
            ReadinessIssue::AmountMissing
            | ReadinessIssue::AmountNotPositive
            | ReadinessIssue::AmountTooLarge => "amount",
            ReadinessIssue::ReasonMissing => "reason",
            ReadinessIssue::StartDateMissing => "start_date",
            ReadinessIssue::InstallmentsMissing => "number_of_installments",
            ReadinessIssue::AffordabilityMissing | ReadinessIssue::AffordabilityAdverse => {
                "affordability"
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReadinessIssue::EmployeeMissing => "select an employee",
            ReadinessIssue::DeductionTypeUnselected => "select a deduction type",
            ReadinessIssue::AmountMissing => "enter a numeric amount",
            ReadinessIssue::AmountNotPositive => "amount must be greater than zero",
            ReadinessIssue::AmountTooLarge => "amount is too large for this many installments",
            ReadinessIssue::ReasonMissing => "enter a reason",
            ReadinessIssue::StartDateMissing => "choose a start date",
            ReadinessIssue::InstallmentsMissing => "enter at least one installment",
            ReadinessIssue::AffordabilityMissing => "run an affordability check",
            ReadinessIssue::AffordabilityAdverse => "employee cannot afford this deduction",
        }
    }
}

/// Outcome of evaluating the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    issues: Vec<ReadinessIssue>,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ReadinessIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ReadinessIssue> {
        self.issues
    }

    pub fn contains(&self, issue: ReadinessIssue) -> bool {
        self.issues.contains(&issue)
    }
}
