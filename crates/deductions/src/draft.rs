use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paydesk_core::{
    Aggregate, AggregateRoot, DeductionRequestId, DomainError, DraftId, EmployeeId, InstitutionId,
};
use paydesk_schedule::{
    InstallmentSchedule, compute_maturity_total, compute_schedule, parse_amount,
    parse_installments,
};

use crate::assessment::AffordabilityAssessment;
use crate::deduction_type::DeductionType;
use crate::employee::Employee;
use crate::readiness::{DraftPolicy, ReadinessIssue, ReadinessReport};
use crate::request::DeductionRequest;

/// Observable wizard state, derived from the lifecycle and the field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Empty,
    EmployeeSelected,
    Ready,
    Submitting,
    Submitted,
    Failed,
}

impl DraftState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftState::Empty => "empty",
            DraftState::EmployeeSelected => "employee_selected",
            DraftState::Ready => "ready",
            DraftState::Submitting => "submitting",
            DraftState::Submitted => "submitted",
            DraftState::Failed => "failed",
        }
    }
}

impl core::fmt::Display for DraftState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lifecycle {
    Editing,
    Submitting,
    Submitted { request_id: DeductionRequestId },
    Failed { error: String },
}

/// A single form edit. Amount and installment count arrive as raw text.
///
/// There is no end-date edit: the end date is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEdit {
    DeductionType(#[serde(with = "crate::deduction_type::selection")] DeductionType),
    Amount(String),
    StartDate(Option<NaiveDate>),
    Installments(String),
    Reason(String),
    ExternalReference(String),
    Reservation(bool),
}

impl DraftEdit {
    pub fn amount(amount: Decimal) -> Self {
        Self::Amount(amount.to_string())
    }

    pub fn installments(count: u32) -> Self {
        Self::Installments(count.to_string())
    }

    /// Whether this edit touches a field the readiness guard reads.
    pub fn is_required_field(&self) -> bool {
        !matches!(self, DraftEdit::ExternalReference(_) | DraftEdit::Reservation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftCommand {
    SelectEmployee(Employee),
    Edit(DraftEdit),
    /// Attach an assessment requested under `epoch`; a stale epoch is a no-op.
    RecordAssessment {
        epoch: u64,
        assessment: AffordabilityAssessment,
    },
    /// Drop the assessment after a failed refresh under `epoch`.
    DiscardAssessment { epoch: u64 },
    BeginSubmission,
    CompleteSubmission(DeductionRequest),
    FailSubmission { error: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    EmployeeSelected { employee: Employee },
    DeductionTypeChanged {
        #[serde(with = "crate::deduction_type::selection")]
        deduction_type: DeductionType,
    },
    AmountChanged { amount: Option<Decimal> },
    StartDateChanged { start_date: Option<NaiveDate> },
    InstallmentsChanged { installments: Option<u32> },
    EndDateRecomputed { end_date: NaiveDate },
    EndDateCleared,
    ReasonChanged { reason: String },
    ExternalReferenceChanged { external_reference: String },
    ReservationToggled { is_reservation: bool },
    AssessmentInvalidated { epoch: u64 },
    AssessmentRecorded { assessment: AffordabilityAssessment },
    AssessmentCleared,
    SubmissionStarted,
    SubmissionSucceeded { request_id: DeductionRequestId },
    SubmissionFailed { error: String },
    DraftReset,
}

impl DraftEvent {
    pub fn invalidates_assessment(&self) -> bool {
        matches!(self, DraftEvent::AssessmentInvalidated { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("draft is not ready to submit: {}", describe(.0))]
    NotReady(Vec<ReadinessIssue>),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn describe(issues: &[ReadinessIssue]) -> String {
    issues
        .iter()
        .map(ReadinessIssue::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Inputs for one affordability call, stamped with the epoch they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentRequest {
    pub employee_id: EmployeeId,
    pub amount: Decimal,
    pub epoch: u64,
}

/// Owned copy of a draft that passed the readiness guard.
///
/// Submission works from this snapshot, so edits made while a request is in
/// flight cannot leak into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDraft {
    pub employee_id: EmployeeId,
    pub employer_institution_id: InstitutionId,
    pub deduction_type: DeductionType,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_installments: u32,
    pub reason: String,
    pub external_reference: Option<String>,
    pub is_reservation: bool,
}

impl ValidatedDraft {
    pub fn maturity_total(&self) -> Option<Decimal> {
        compute_maturity_total(self.amount, self.number_of_installments)
    }
}

/// Read-only view handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSnapshot {
    pub id: DraftId,
    pub state: DraftState,
    pub employee: Option<Employee>,
    #[serde(with = "crate::deduction_type::selection")]
    pub deduction_type: DeductionType,
    pub amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub number_of_installments: Option<u32>,
    pub end_date: Option<NaiveDate>,
    pub maturity_total: Option<Decimal>,
    pub is_reservation: bool,
    pub reason: String,
    pub external_reference: String,
    pub affordability: Option<AffordabilityAssessment>,
    pub issues: Vec<ReadinessIssue>,
    pub last_error: Option<String>,
    pub submitted_request_id: Option<DeductionRequestId>,
    pub version: u64,
}

/// Aggregate root: the in-progress deduction request of one wizard session.
///
/// `employee` carries both the employee id and the employer institution, so
/// the two are always set together. `end_date` has no setter; it changes only
/// through `EndDateRecomputed`, emitted when the start date or installment
/// count changes and both are present, and `EndDateCleared`, emitted when the
/// start date is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionDraft {
    id: DraftId,
    policy: DraftPolicy,
    employee: Option<Employee>,
    deduction_type: DeductionType,
    amount: Option<Decimal>,
    start_date: Option<NaiveDate>,
    number_of_installments: Option<u32>,
    end_date: Option<NaiveDate>,
    is_reservation: bool,
    reason: String,
    external_reference: String,
    affordability: Option<AffordabilityAssessment>,
    assessment_epoch: u64,
    lifecycle: Lifecycle,
    version: u64,
}

impl DeductionDraft {
    pub fn new(id: DraftId, policy: DraftPolicy) -> Self {
        Self {
            id,
            policy,
            employee: None,
            deduction_type: DeductionType::Unselected,
            amount: None,
            start_date: None,
            number_of_installments: None,
            end_date: None,
            is_reservation: false,
            reason: String::new(),
            external_reference: String::new(),
            affordability: None,
            assessment_epoch: 0,
            lifecycle: Lifecycle::Editing,
            version: 0,
        }
    }

    pub fn policy(&self) -> DraftPolicy {
        self.policy
    }

    pub fn employee(&self) -> Option<&Employee> {
        self.employee.as_ref()
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee.as_ref().map(|e| e.id)
    }

    pub fn employer_institution_id(&self) -> Option<InstitutionId> {
        self.employee.as_ref().map(|e| e.employer_institution_id)
    }

    pub fn deduction_type(&self) -> DeductionType {
        self.deduction_type
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn number_of_installments(&self) -> Option<u32> {
        self.number_of_installments
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn is_reservation(&self) -> bool {
        self.is_reservation
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn external_reference(&self) -> &str {
        &self.external_reference
    }

    pub fn affordability(&self) -> Option<&AffordabilityAssessment> {
        self.affordability.as_ref()
    }

    /// Counter bumped whenever the cached assessment becomes stale.
    pub fn assessment_epoch(&self) -> u64 {
        self.assessment_epoch
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn submitted_request_id(&self) -> Option<DeductionRequestId> {
        match &self.lifecycle {
            Lifecycle::Submitted { request_id } => Some(*request_id),
            _ => None,
        }
    }

    pub fn readiness(&self) -> ReadinessReport {
        self.policy.evaluate(self)
    }

    pub fn state(&self) -> DraftState {
        match &self.lifecycle {
            Lifecycle::Submitting => DraftState::Submitting,
            Lifecycle::Submitted { .. } => DraftState::Submitted,
            Lifecycle::Failed { .. } => DraftState::Failed,
            Lifecycle::Editing if self.employee.is_none() => DraftState::Empty,
            Lifecycle::Editing if self.readiness().is_ready() => DraftState::Ready,
            Lifecycle::Editing => DraftState::EmployeeSelected,
        }
    }

    pub fn maturity_total(&self) -> Option<Decimal> {
        match (self.amount, self.number_of_installments) {
            (Some(amount), Some(months)) if amount > Decimal::ZERO => {
                compute_maturity_total(amount, months)
            }
            _ => None,
        }
    }

    /// Full installment plan, once amount, start date, and count are valid.
    pub fn schedule(&self) -> Option<InstallmentSchedule> {
        let start = self.start_date?;
        let months = self.number_of_installments?;
        let amount = self.amount?;
        InstallmentSchedule::build(start, months, amount).ok()
    }

    /// Affordability inputs, or `None` when the preconditions do not hold.
    pub fn assessment_request(&self) -> Option<AssessmentRequest> {
        let employee_id = self.employee_id()?;
        let amount = self.amount.filter(|a| *a > Decimal::ZERO)?;
        Some(AssessmentRequest {
            employee_id,
            amount,
            epoch: self.assessment_epoch,
        })
    }

    /// Snapshot the draft for submission, re-checking the guard.
    pub fn validated(&self) -> Result<ValidatedDraft, DraftError> {
        let report = self.readiness();
        if !report.is_ready() {
            return Err(DraftError::NotReady(report.into_issues()));
        }

        let (Some(employee), Some(amount), Some(start_date), Some(months)) = (
            self.employee.as_ref(),
            self.amount,
            self.start_date,
            self.number_of_installments,
        ) else {
            return Err(DomainError::invariant("ready draft is missing a required field").into());
        };

        let end_date = compute_schedule(start_date, i64::from(months))
            .ok_or_else(|| DomainError::validation("end date falls outside the supported calendar"))?;

        let external_reference = self.external_reference.trim();

        Ok(ValidatedDraft {
            employee_id: employee.id,
            employer_institution_id: employee.employer_institution_id,
            deduction_type: self.deduction_type,
            amount,
            start_date,
            end_date,
            number_of_installments: months,
            reason: self.reason.trim().to_string(),
            external_reference: (!external_reference.is_empty())
                .then(|| external_reference.to_string()),
            is_reservation: self.is_reservation,
        })
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            id: self.id,
            state: self.state(),
            employee: self.employee.clone(),
            deduction_type: self.deduction_type,
            amount: self.amount,
            start_date: self.start_date,
            number_of_installments: self.number_of_installments,
            end_date: self.end_date,
            maturity_total: self.maturity_total(),
            is_reservation: self.is_reservation,
            reason: self.reason.clone(),
            external_reference: self.external_reference.clone(),
            affordability: self.affordability.clone(),
            issues: self.readiness().into_issues(),
            last_error: self.last_error().map(str::to_string),
            submitted_request_id: self.submitted_request_id(),
            version: self.version,
        }
    }
}

impl AggregateRoot for DeductionDraft {
    type Id = DraftId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for DeductionDraft {
    type Command = DraftCommand;
    type Event = DraftEvent;
    type Error = DraftError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DraftEvent::EmployeeSelected { employee } => {
                self.employee = Some(employee.clone());
                self.resume_editing();
            }
            DraftEvent::DeductionTypeChanged { deduction_type } => {
                self.deduction_type = *deduction_type;
                self.resume_editing();
            }
            DraftEvent::AmountChanged { amount } => {
                self.amount = *amount;
                self.resume_editing();
            }
            DraftEvent::StartDateChanged { start_date } => {
                self.start_date = *start_date;
                self.resume_editing();
            }
            DraftEvent::InstallmentsChanged { installments } => {
                self.number_of_installments = *installments;
                self.resume_editing();
            }
            DraftEvent::EndDateRecomputed { end_date } => {
                self.end_date = Some(*end_date);
            }
            DraftEvent::EndDateCleared => {
                self.end_date = None;
            }
            DraftEvent::ReasonChanged { reason } => {
                self.reason = reason.clone();
                self.resume_editing();
            }
            DraftEvent::ExternalReferenceChanged { external_reference } => {
                self.external_reference = external_reference.clone();
                self.resume_editing();
            }
            DraftEvent::ReservationToggled { is_reservation } => {
                self.is_reservation = *is_reservation;
                self.resume_editing();
            }
            DraftEvent::AssessmentInvalidated { epoch } => {
                self.affordability = None;
                self.assessment_epoch = *epoch;
            }
            DraftEvent::AssessmentRecorded { assessment } => {
                self.affordability = Some(assessment.clone());
            }
            DraftEvent::AssessmentCleared => {
                self.affordability = None;
            }
            DraftEvent::SubmissionStarted => {
                self.lifecycle = Lifecycle::Submitting;
            }
            DraftEvent::SubmissionSucceeded { request_id } => {
                self.clear_fields();
                self.lifecycle = Lifecycle::Submitted {
                    request_id: *request_id,
                };
            }
            DraftEvent::SubmissionFailed { error } => {
                self.lifecycle = Lifecycle::Failed {
                    error: error.clone(),
                };
            }
            DraftEvent::DraftReset => {
                self.clear_fields();
                self.lifecycle = Lifecycle::Editing;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DraftCommand::SelectEmployee(employee) => self.handle_select(employee),
            DraftCommand::Edit(edit) => self.handle_edit(edit),
            DraftCommand::RecordAssessment { epoch, assessment } => {
                Ok(self.handle_record(*epoch, assessment))
            }
            DraftCommand::DiscardAssessment { epoch } => Ok(self.handle_discard(*epoch)),
            DraftCommand::BeginSubmission => self.handle_begin(),
            DraftCommand::CompleteSubmission(request) => self.handle_complete(request),
            DraftCommand::FailSubmission { error } => self.handle_fail(error),
            DraftCommand::Reset => Ok(vec![DraftEvent::DraftReset]),
        }
    }
}

impl DeductionDraft {
    fn resume_editing(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Submitting) {
            self.lifecycle = Lifecycle::Editing;
        }
    }

    /// Clears every field. The epoch keeps counting so responses requested
    /// before the reset can never match again.
    fn clear_fields(&mut self) {
        self.employee = None;
        self.deduction_type = DeductionType::Unselected;
        self.amount = None;
        self.start_date = None;
        self.number_of_installments = None;
        self.end_date = None;
        self.is_reservation = false;
        self.reason.clear();
        self.external_reference.clear();
        self.affordability = None;
        self.assessment_epoch += 1;
    }

    fn ensure_editable(&self, action: &str) -> Result<(), DraftError> {
        if matches!(self.lifecycle, Lifecycle::Submitting) {
            return Err(DomainError::invalid_transition(DraftState::Submitting.as_str(), action).into());
        }
        Ok(())
    }

    fn invalidation(&self) -> DraftEvent {
        DraftEvent::AssessmentInvalidated {
            epoch: self.assessment_epoch + 1,
        }
    }

    fn recompute_end_date(start: Option<NaiveDate>, months: Option<u32>) -> Option<DraftEvent> {
        let end_date = compute_schedule(start?, i64::from(months?))?;
        Some(DraftEvent::EndDateRecomputed { end_date })
    }

    fn handle_select(&self, employee: &Employee) -> Result<Vec<DraftEvent>, DraftError> {
        self.ensure_editable("select an employee")?;

        let mut events = vec![DraftEvent::EmployeeSelected {
            employee: employee.clone(),
        }];
        if self.employee_id() != Some(employee.id) {
            events.push(self.invalidation());
        }
        Ok(events)
    }

    fn handle_edit(&self, edit: &DraftEdit) -> Result<Vec<DraftEvent>, DraftError> {
        self.ensure_editable("edit the draft")?;

        let mut events = Vec::new();
        match edit {
            DraftEdit::DeductionType(deduction_type) => {
                events.push(DraftEvent::DeductionTypeChanged {
                    deduction_type: *deduction_type,
                });
            }
            DraftEdit::Amount(raw) => {
                let amount = parse_amount(raw);
                events.push(DraftEvent::AmountChanged { amount });
                if amount != self.amount {
                    events.push(self.invalidation());
                }
            }
            DraftEdit::StartDate(start_date) => {
                events.push(DraftEvent::StartDateChanged {
                    start_date: *start_date,
                });
                if start_date.is_none() && self.end_date.is_some() {
                    events.push(DraftEvent::EndDateCleared);
                }
                events.extend(Self::recompute_end_date(
                    *start_date,
                    self.number_of_installments,
                ));
            }
            DraftEdit::Installments(raw) => {
                let installments = parse_installments(raw);
                events.push(DraftEvent::InstallmentsChanged { installments });
                events.extend(Self::recompute_end_date(self.start_date, installments));
            }
            DraftEdit::Reason(reason) => {
                events.push(DraftEvent::ReasonChanged {
                    reason: reason.clone(),
                });
            }
            DraftEdit::ExternalReference(external_reference) => {
                events.push(DraftEvent::ExternalReferenceChanged {
                    external_reference: external_reference.clone(),
                });
            }
            DraftEdit::Reservation(is_reservation) => {
                events.push(DraftEvent::ReservationToggled {
                    is_reservation: *is_reservation,
                });
            }
        }
        Ok(events)
    }

    fn handle_record(&self, epoch: u64, assessment: &AffordabilityAssessment) -> Vec<DraftEvent> {
        if epoch != self.assessment_epoch {
            return Vec::new();
        }
        vec![DraftEvent::AssessmentRecorded {
            assessment: assessment.clone(),
        }]
    }

    fn handle_discard(&self, epoch: u64) -> Vec<DraftEvent> {
        if epoch != self.assessment_epoch || self.affordability.is_none() {
            return Vec::new();
        }
        vec![DraftEvent::AssessmentCleared]
    }

    fn handle_begin(&self) -> Result<Vec<DraftEvent>, DraftError> {
        match &self.lifecycle {
            Lifecycle::Submitting => {
                return Err(DomainError::conflict("a submission is already in progress").into());
            }
            Lifecycle::Submitted { .. } => {
                return Err(
                    DomainError::invalid_transition(DraftState::Submitted.as_str(), "submit").into(),
                );
            }
            Lifecycle::Editing | Lifecycle::Failed { .. } => {}
        }

        let report = self.readiness();
        if !report.is_ready() {
            return Err(DraftError::NotReady(report.into_issues()));
        }

        Ok(vec![DraftEvent::SubmissionStarted])
    }

    fn handle_complete(&self, request: &DeductionRequest) -> Result<Vec<DraftEvent>, DraftError> {
        if !matches!(self.lifecycle, Lifecycle::Submitting) {
            return Err(
                DomainError::invalid_transition(self.state().as_str(), "complete a submission").into(),
            );
        }
        Ok(vec![DraftEvent::SubmissionSucceeded {
            request_id: request.id,
        }])
    }

    fn handle_fail(&self, error: &str) -> Result<Vec<DraftEvent>, DraftError> {
        if !matches!(self.lifecycle, Lifecycle::Submitting) {
            return Err(
                DomainError::invalid_transition(self.state().as_str(), "fail a submission").into(),
            );
        }
        Ok(vec![DraftEvent::SubmissionFailed {
            error: error.to_string(),
        }])
    }
}
