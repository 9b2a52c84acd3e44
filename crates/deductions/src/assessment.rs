use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::ValueObject;

/// Risk band assigned by the scoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
        }
    }
}

/// Banner shown next to the amount field when an assessment is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityVerdict {
    Affordable,
    NotAffordable,
}

/// Affordability verdict computed by the external scoring service.
///
/// Immutable once received. A newer assessment replaces an older one
/// wholesale; fields are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityAssessment {
    pub basic_salary: Decimal,
    pub existing_deductions: Decimal,
    pub existing_deduction_percentage: Decimal,
    pub requested_amount: Decimal,
    pub requested_percentage: Decimal,
    pub net_salary_after_deduction: Decimal,
    pub risk_level: RiskLevel,
    pub risk_score: Decimal,
    pub can_afford: bool,
    pub recommendation: String,
}

impl ValueObject for AffordabilityAssessment {}

impl AffordabilityAssessment {
    pub fn verdict(&self) -> AffordabilityVerdict {
        if self.can_afford {
            AffordabilityVerdict::Affordable
        } else {
            AffordabilityVerdict::NotAffordable
        }
    }
}
