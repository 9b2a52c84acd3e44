//! In-memory collaborator adapters.
//!
//! Intended for tests, demos, and local development. Data lives in a
//! `RwLock`ed collection; nothing survives the process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

use paydesk_core::{DeductionRequestId, EmployeeId};
use paydesk_deductions::{
    AffordabilityAssessment, DeductionRequest, DeductionRequestStatus, Employee,
    NewDeductionRequest, RiskLevel,
};

use crate::context::InstitutionContext;
use crate::gateway::{AffordabilityScorer, DeductionRequestStore, EmployeeDirectory, GatewayError};

#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: RwLock::new(employees.into_iter().collect()),
        }
    }

    pub fn insert(&self, employee: Employee) {
        self.employees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(employee);
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn search(
        &self,
        context: &InstitutionContext,
        query: &str,
    ) -> Result<Vec<Employee>, GatewayError> {
        let employees = self.employees.read().unwrap_or_else(PoisonError::into_inner);
        Ok(employees
            .iter()
            .filter(|e| context.can_see(e.employer_institution_id))
            .filter(|e| e.matches_query(query))
            .cloned()
            .collect())
    }
}

/// Total commitment (existing + requested, % of basic salary) above which
/// a deduction is not affordable.
pub const AFFORDABLE_COMMITMENT_LIMIT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const LOW_RISK_LIMIT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Rule-based scorer over a fixed salary book.
#[derive(Debug, Default)]
pub struct InMemoryAffordabilityScorer {
    // employee -> (basic salary, existing monthly deductions)
    book: RwLock<HashMap<EmployeeId, (Decimal, Decimal)>>,
}

impl InMemoryAffordabilityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_salary(&self, employee_id: EmployeeId, basic_salary: Decimal, existing_deductions: Decimal) {
        self.book
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(employee_id, (basic_salary, existing_deductions));
    }
}

/// `None` when the intermediate product or quotient does not fit a `Decimal`.
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    let percent = part.checked_mul(Decimal::ONE_HUNDRED)?.checked_div(whole)?;
    Some(percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[async_trait::async_trait]
impl AffordabilityScorer for InMemoryAffordabilityScorer {
    async fn assess(
        &self,
        employee_id: EmployeeId,
        requested_amount: Decimal,
    ) -> Result<AffordabilityAssessment, GatewayError> {
        let entry = self
            .book
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&employee_id)
            .copied();
        let Some((basic_salary, existing_deductions)) = entry else {
            return Err(GatewayError::Validation(format!(
                "no salary record for employee {employee_id}"
            )));
        };
        if basic_salary <= Decimal::ZERO {
            return Err(GatewayError::Validation(format!(
                "employee {employee_id} has no positive basic salary"
            )));
        }

        let out_of_range =
            || GatewayError::Validation(format!("requested amount {requested_amount} is out of range"));
        let existing_deduction_percentage =
            percent_of(existing_deductions, basic_salary).ok_or_else(out_of_range)?;
        let requested_percentage = percent_of(requested_amount, basic_salary).ok_or_else(out_of_range)?;
        let total = existing_deduction_percentage
            .checked_add(requested_percentage)
            .ok_or_else(out_of_range)?;
        let net_salary_after_deduction = basic_salary
            .checked_sub(existing_deductions)
            .and_then(|net| net.checked_sub(requested_amount))
            .ok_or_else(out_of_range)?;

        let risk_level = if total <= LOW_RISK_LIMIT {
            RiskLevel::Low
        } else if total <= AFFORDABLE_COMMITMENT_LIMIT {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
        let can_afford = total <= AFFORDABLE_COMMITMENT_LIMIT && net_salary_after_deduction > Decimal::ZERO;
        let recommendation = if can_afford {
            format!("Deduction fits within the {AFFORDABLE_COMMITMENT_LIMIT}% commitment limit")
        } else {
            format!("Total commitment of {total}% exceeds the {AFFORDABLE_COMMITMENT_LIMIT}% limit")
        };

        Ok(AffordabilityAssessment {
            basic_salary,
            existing_deductions,
            existing_deduction_percentage,
            requested_amount,
            requested_percentage,
            net_salary_after_deduction,
            risk_level,
            risk_score: total.min(Decimal::ONE_HUNDRED),
            can_afford,
            recommendation,
        })
    }
}

/// Creates requests in `PENDING` status.
///
/// External references are unique per requesting institution.
#[derive(Debug, Default)]
pub struct InMemoryDeductionRequestStore {
    requests: RwLock<Vec<DeductionRequest>>,
}

impl InMemoryDeductionRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list(&self) -> Vec<DeductionRequest> {
        self.requests.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn get(&self, id: DeductionRequestId) -> Option<DeductionRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait::async_trait]
impl DeductionRequestStore for InMemoryDeductionRequestStore {
    async fn create(&self, request: &NewDeductionRequest) -> Result<DeductionRequest, GatewayError> {
        if !request.deduction_type.is_selected() {
            return Err(GatewayError::Validation("deduction type is required".to_string()));
        }
        if request.amount <= Decimal::ZERO {
            return Err(GatewayError::Validation("amount must be greater than zero".to_string()));
        }

        let mut requests = self.requests.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(reference) = &request.external_reference {
            let taken = requests.iter().any(|r| {
                r.requested_by == request.requested_by
                    && r.external_reference.as_deref() == Some(reference.as_str())
            });
            if taken {
                return Err(GatewayError::Validation(format!(
                    "external reference {reference} already used"
                )));
            }
        }

        let created = DeductionRequest {
            id: DeductionRequestId::new(),
            requested_by: request.requested_by,
            employee_id: request.employee_id,
            employer_institution_id: request.employer_institution_id,
            deduction_type: request.deduction_type,
            amount: request.amount,
            start_date: request.start_date,
            end_date: request.end_date,
            number_of_installments: request.number_of_installments,
            reason: request.reason.clone(),
            external_reference: request.external_reference.clone(),
            is_reservation: request.is_reservation,
            status: DeductionRequestStatus::Pending,
            created_at: Utc::now(),
        };
        requests.push(created.clone());
        Ok(created)
    }
}
