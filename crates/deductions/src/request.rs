use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::{DeductionRequestId, EmployeeId, Entity, InstitutionId};
use paydesk_schedule::compute_maturity_total;

use crate::deduction_type::DeductionType;
use crate::draft::ValidatedDraft;

/// Lifecycle status of a persisted request (owned by the persistence service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionRequestStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Completed,
    Cancelled,
}

/// Payload sent to the persistence service: a validated draft plus the
/// institution acting on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeductionRequest {
    pub requested_by: InstitutionId,
    pub employee_id: EmployeeId,
    pub employer_institution_id: InstitutionId,
    pub deduction_type: DeductionType,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub number_of_installments: u32,
    pub reason: String,
    pub external_reference: Option<String>,
    pub is_reservation: bool,
}

impl NewDeductionRequest {
    pub fn from_validated(draft: ValidatedDraft, requested_by: InstitutionId) -> Self {
        Self {
            requested_by,
            employee_id: draft.employee_id,
            employer_institution_id: draft.employer_institution_id,
            deduction_type: draft.deduction_type,
            amount: draft.amount,
            start_date: draft.start_date,
            end_date: Some(draft.end_date),
            number_of_installments: draft.number_of_installments,
            reason: draft.reason,
            external_reference: draft.external_reference,
            is_reservation: draft.is_reservation,
        }
    }
}

/// Request record created by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRequest {
    pub id: DeductionRequestId,
    pub requested_by: InstitutionId,
    pub employee_id: EmployeeId,
    pub employer_institution_id: InstitutionId,
    pub deduction_type: DeductionType,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub number_of_installments: u32,
    pub reason: String,
    pub external_reference: Option<String>,
    pub is_reservation: bool,
    pub status: DeductionRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl DeductionRequest {
    pub fn maturity_total(&self) -> Option<Decimal> {
        compute_maturity_total(self.amount, self.number_of_installments)
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_reservation {
            "Reservation"
        } else {
            "Deduction request"
        }
    }
}

impl Entity for DeductionRequest {
    type Id = DeductionRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
