use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use paydesk_core::{DomainError, EmployeeId};
use paydesk_deductions::AffordabilityAssessment;

use crate::gateway::{AffordabilityScorer, GatewayError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// Inputs were rejected locally; the scorer was not called.
    #[error(transparent)]
    Precondition(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Checks preconditions locally before calling the scorer.
#[derive(Clone)]
pub struct AffordabilityGateway {
    scorer: Arc<dyn AffordabilityScorer>,
}

impl AffordabilityGateway {
    pub fn new(scorer: Arc<dyn AffordabilityScorer>) -> Self {
        Self { scorer }
    }

    pub async fn assess(
        &self,
        employee_id: EmployeeId,
        requested_amount: Decimal,
    ) -> Result<AffordabilityAssessment, AssessmentError> {
        if requested_amount <= Decimal::ZERO {
            return Err(DomainError::validation("requested amount must be greater than zero").into());
        }

        debug!(%employee_id, %requested_amount, "requesting affordability assessment");
        let assessment = self.scorer.assess(employee_id, requested_amount).await?;
        debug!(
            %employee_id,
            can_afford = assessment.can_afford,
            risk = assessment.risk_level.label(),
            "affordability assessment received"
        );
        Ok(assessment)
    }
}
