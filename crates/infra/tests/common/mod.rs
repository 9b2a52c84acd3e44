#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::oneshot;

use paydesk_core::{DeductionRequestId, EmployeeId, InstitutionId};
use paydesk_deductions::{
    AffordabilityAssessment, DeductionRequest, DeductionRequestStatus, DraftPolicy, Employee,
    EmploymentStatus, NewDeductionRequest, RiskLevel,
};
use paydesk_infra::{
    AffordabilityScorer, DeductionRequestStore, DeductionWizard, EmployeeDirectory, GatewayError,
    InstitutionContext, InstitutionKind,
};

/// Call log plus optional gates: the n-th call waits on the n-th gate
/// handed out by [`Script::gate`]; calls without a gate answer at once.
pub struct Script<T> {
    calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Receiver<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gates: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn gate(&self) -> oneshot::Sender<T> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self, default: impl FnOnce() -> T) -> T {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| default()),
            None => default(),
        }
    }
}

/// Wait (cooperatively) until `script` has seen `n` calls.
pub async fn wait_for_calls<T>(script: &Script<T>, n: usize) {
    while script.calls() < n {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub employees: Vec<Employee>,
    pub script: Script<Result<Vec<Employee>, GatewayError>>,
    pub queries: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl EmployeeDirectory for FakeDirectory {
    async fn search(
        &self,
        _context: &InstitutionContext,
        query: &str,
    ) -> Result<Vec<Employee>, GatewayError> {
        self.queries.lock().unwrap().push(query.to_string());
        let matches: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.matches_query(query))
            .cloned()
            .collect();
        self.script.next(move || Ok(matches)).await
    }
}

#[derive(Default)]
pub struct FakeScorer {
    pub script: Script<Result<AffordabilityAssessment, GatewayError>>,
    pub amounts: Mutex<Vec<Decimal>>,
    /// Answer `can_afford = false` when no gate overrides the result.
    pub adverse: bool,
}

#[async_trait::async_trait]
impl AffordabilityScorer for FakeScorer {
    async fn assess(
        &self,
        _employee_id: EmployeeId,
        requested_amount: Decimal,
    ) -> Result<AffordabilityAssessment, GatewayError> {
        self.amounts.lock().unwrap().push(requested_amount);
        let can_afford = !self.adverse;
        self.script
            .next(move || Ok(assessment(requested_amount, can_afford)))
            .await
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub script: Script<Result<(), GatewayError>>,
    pub created: Mutex<Vec<DeductionRequest>>,
}

impl FakeStore {
    pub fn created(&self) -> Vec<DeductionRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DeductionRequestStore for FakeStore {
    async fn create(&self, request: &NewDeductionRequest) -> Result<DeductionRequest, GatewayError> {
        self.script.next(|| Ok(())).await?;
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
        self.created.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn employee(number: &str, national_id: &str, employer: InstitutionId) -> Employee {
    Employee {
        id: EmployeeId::new(),
        display_name: format!("Employee {number}"),
        employee_number: number.to_string(),
        national_id: national_id.to_string(),
        employer_institution_id: employer,
        basic_salary: Some(dec!(450000)),
        employment_status: EmploymentStatus::Active,
    }
}

pub fn assessment(requested_amount: Decimal, can_afford: bool) -> AffordabilityAssessment {
    AffordabilityAssessment {
        basic_salary: dec!(450000),
        existing_deductions: dec!(45000),
        existing_deduction_percentage: dec!(10),
        requested_amount,
        requested_percentage: (requested_amount * dec!(100) / dec!(450000)).round_dp(2),
        net_salary_after_deduction: dec!(405000) - requested_amount,
        risk_level: if can_afford { RiskLevel::Low } else { RiskLevel::High },
        risk_score: if can_afford { dec!(21.11) } else { dec!(78.5) },
        can_afford,
        recommendation: if can_afford {
            "Affordable".to_string()
        } else {
            "Exceeds commitment limit".to_string()
        },
    }
}

pub struct Harness {
    pub institution: InstitutionId,
    pub directory: Arc<FakeDirectory>,
    pub scorer: Arc<FakeScorer>,
    pub store: Arc<FakeStore>,
    pub wizard: DeductionWizard,
}

impl Harness {
    pub fn new(policy: DraftPolicy) -> Self {
        Self::with(policy, FakeDirectory::default(), FakeScorer::default())
    }

    pub fn with(policy: DraftPolicy, directory: FakeDirectory, scorer: FakeScorer) -> Self {
        let institution = InstitutionId::new();
        let directory = Arc::new(directory);
        let scorer = Arc::new(scorer);
        let store = Arc::new(FakeStore::default());
        let wizard = DeductionWizard::new(
            InstitutionContext::new(institution, InstitutionKind::Sacco),
            policy,
            directory.clone(),
            scorer.clone(),
            store.clone(),
        );
        Self {
            institution,
            directory,
            scorer,
            store,
            wizard,
        }
    }
}
