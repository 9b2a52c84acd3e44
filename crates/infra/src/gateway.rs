//! Collaborator boundaries: the three external services the wizard consumes.
//!
//! Formats are owned by those services. Adapters (HTTP, in-memory, test
//! fakes) implement these traits; orchestration code only sees the traits.

use rust_decimal::Decimal;
use thiserror::Error;

use paydesk_core::EmployeeId;
use paydesk_deductions::{AffordabilityAssessment, DeductionRequest, Employee, NewDeductionRequest};

use crate::context::InstitutionContext;

/// Classified collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service rejected the input (e.g. duplicate external reference).
    #[error("rejected by service: {0}")]
    Validation(String),

    #[error("not authorized to call service")]
    Unauthorized,

    #[error("service error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Transport failure or timeout; the request may not have arrived.
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Map a non-2xx HTTP status to an error class.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 409 | 422 => Self::Validation(message),
            401 | 403 => Self::Unauthorized,
            _ => Self::Server { status, message },
        }
    }

    /// Server-side validation failure on the submitted data.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether retrying the same call unchanged may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Employee directory search.
#[async_trait::async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Free-text search (national ID or employee number) within what the
    /// acting institution may see.
    async fn search(
        &self,
        context: &InstitutionContext,
        query: &str,
    ) -> Result<Vec<Employee>, GatewayError>;
}

/// Affordability scoring service (read-only, idempotent).
#[async_trait::async_trait]
pub trait AffordabilityScorer: Send + Sync {
    async fn assess(
        &self,
        employee_id: EmployeeId,
        requested_amount: Decimal,
    ) -> Result<AffordabilityAssessment, GatewayError>;
}

/// Deduction request persistence service. All-or-nothing per call.
#[async_trait::async_trait]
pub trait DeductionRequestStore: Send + Sync {
    async fn create(&self, request: &NewDeductionRequest) -> Result<DeductionRequest, GatewayError>;
}
