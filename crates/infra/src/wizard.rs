//! Deduction wizard orchestration.
//!
//! The `DeductionWizard` owns one `DeductionDraft` and wires it to the
//! collaborators:
//! - executes draft commands under a short-lived lock
//! - calls collaborators with the lock released
//! - feeds results back as commands stamped with the epoch they were
//!   requested under, so late answers are dropped by the draft itself
//!
//! Clones share the same draft, so a UI can hand a clone to each task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use paydesk_core::{Aggregate, AggregateRoot, DomainError, DraftId};
use paydesk_deductions::{
    AffordabilityAssessment, DeductionDraft, DeductionRequest, DraftCommand, DraftEdit, DraftError,
    DraftEvent, DraftPolicy, DraftSnapshot, DraftState, Employee, ReadinessIssue, ReadinessReport,
};

use crate::affordability::{AffordabilityGateway, AssessmentError};
use crate::context::InstitutionContext;
use crate::gateway::{AffordabilityScorer, DeductionRequestStore, EmployeeDirectory, GatewayError};
use crate::resolver::{EmployeeResolver, SearchOutcome, SearchView};
use crate::submission::SubmissionGateway;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("draft is not ready to submit")]
    NotReady(Vec<ReadinessIssue>),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<DraftError> for WizardError {
    fn from(value: DraftError) -> Self {
        match value {
            DraftError::NotReady(issues) => WizardError::NotReady(issues),
            DraftError::Domain(err) => WizardError::Domain(err),
        }
    }
}

/// Result of an affordability refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentOutcome {
    /// The command did not touch anything the assessment depends on.
    NotRequested,
    /// Employee or a positive amount is missing; no call was made.
    Skipped,
    Recorded(AffordabilityAssessment),
    /// The inputs changed while the call was in flight; result dropped.
    Stale,
    Failed(GatewayError),
}

#[derive(Clone)]
pub struct DeductionWizard {
    context: InstitutionContext,
    resolver: EmployeeResolver,
    affordability: AffordabilityGateway,
    submission: SubmissionGateway,
    draft: Arc<Mutex<DeductionDraft>>,
}

impl DeductionWizard {
    pub fn new(
        context: InstitutionContext,
        policy: DraftPolicy,
        directory: Arc<dyn EmployeeDirectory>,
        scorer: Arc<dyn AffordabilityScorer>,
        store: Arc<dyn DeductionRequestStore>,
    ) -> Self {
        Self {
            context,
            resolver: EmployeeResolver::new(context, directory),
            affordability: AffordabilityGateway::new(scorer),
            submission: SubmissionGateway::new(context, store),
            draft: Arc::new(Mutex::new(DeductionDraft::new(DraftId::new(), policy))),
        }
    }

    pub fn context(&self) -> &InstitutionContext {
        &self.context
    }

    pub async fn search_employees(&self, query: &str) -> SearchOutcome {
        self.resolver.search(query).await
    }

    pub fn search_view(&self) -> SearchView {
        self.resolver.view()
    }

    /// Select an employee; re-assesses affordability when the employee
    /// changed and an amount is already present.
    pub async fn select_employee(&self, employee: Employee) -> Result<AssessmentOutcome, WizardError> {
        let events = self.execute(DraftCommand::SelectEmployee(employee))?;
        Ok(self.follow_up(&events).await)
    }

    /// Apply an edit and re-assess immediately if it invalidated the
    /// current assessment.
    pub async fn edit(&self, edit: DraftEdit) -> Result<AssessmentOutcome, WizardError> {
        let events = self.execute(DraftCommand::Edit(edit))?;
        Ok(self.follow_up(&events).await)
    }

    /// Apply an edit without calling the scorer (e.g. on every keystroke).
    ///
    /// Returns `true` when the assessment was invalidated and a later
    /// [`refresh_affordability`](Self::refresh_affordability) is due.
    pub fn stage_edit(&self, edit: DraftEdit) -> Result<bool, WizardError> {
        let events = self.execute(DraftCommand::Edit(edit))?;
        Ok(events.iter().any(DraftEvent::invalidates_assessment))
    }

    /// Assess the current (employee, amount) pair.
    pub async fn refresh_affordability(&self) -> AssessmentOutcome {
        let request = self.lock().assessment_request();
        let Some(request) = request else {
            debug!("affordability inputs incomplete; skipping assessment");
            return AssessmentOutcome::Skipped;
        };

        let result = self
            .affordability
            .assess(request.employee_id, request.amount)
            .await;

        let mut draft = self.lock();
        match result {
            Ok(assessment) => {
                let command = DraftCommand::RecordAssessment {
                    epoch: request.epoch,
                    assessment: assessment.clone(),
                };
                match draft.execute(&command) {
                    Ok(events) if !events.is_empty() => AssessmentOutcome::Recorded(assessment),
                    Ok(_) => {
                        debug!(
                            epoch = request.epoch,
                            current = draft.assessment_epoch(),
                            "discarding stale affordability assessment"
                        );
                        AssessmentOutcome::Stale
                    }
                    Err(err) => {
                        warn!(error = %err, "could not record affordability assessment");
                        AssessmentOutcome::Stale
                    }
                }
            }
            Err(AssessmentError::Precondition(err)) => {
                debug!(error = %err, "affordability preconditions not met");
                AssessmentOutcome::Skipped
            }
            Err(AssessmentError::Gateway(err)) => {
                if draft.assessment_epoch() != request.epoch {
                    return AssessmentOutcome::Stale;
                }
                warn!(error = %err, employee_id = %request.employee_id, "affordability check failed");
                if let Err(discard) = draft.execute(&DraftCommand::DiscardAssessment {
                    epoch: request.epoch,
                }) {
                    warn!(error = %discard, "could not discard affordability assessment");
                }
                AssessmentOutcome::Failed(err)
            }
        }
    }

    /// Submit the draft.
    ///
    /// At most one submission is in flight: a second call while one is
    /// pending fails with a conflict and never reaches the store.
    pub async fn submit(&self) -> Result<DeductionRequest, WizardError> {
        let (draft_id, validated) = {
            let mut draft = self.lock();
            draft.execute(&DraftCommand::BeginSubmission)?;
            match draft.validated() {
                Ok(validated) => (*draft.id(), validated),
                Err(err) => {
                    let command = DraftCommand::FailSubmission {
                        error: err.to_string(),
                    };
                    if let Err(fail) = draft.execute(&command) {
                        warn!(error = %fail, "could not record submission failure");
                    }
                    return Err(err.into());
                }
            }
        };

        info!(
            %draft_id,
            employee_id = %validated.employee_id,
            amount = %validated.amount,
            installments = validated.number_of_installments,
            "submitting deduction request"
        );
        let result = self.submission.submit(validated).await;

        let mut draft = self.lock();
        match result {
            Ok(request) => {
                if let Err(err) = draft.execute(&DraftCommand::CompleteSubmission(request.clone())) {
                    warn!(%draft_id, request_id = %request.id, error = %err, "draft changed while submission was in flight");
                }
                Ok(request)
            }
            Err(err) => {
                let command = DraftCommand::FailSubmission {
                    error: err.to_string(),
                };
                if let Err(fail) = draft.execute(&command) {
                    warn!(%draft_id, error = %fail, "draft changed while submission was in flight");
                }
                Err(err.into())
            }
        }
    }

    /// Clear the draft and the search panel.
    pub fn reset(&self) {
        if let Err(err) = self.execute(DraftCommand::Reset) {
            warn!(error = %err, "draft reset failed");
        }
        self.resolver.clear();
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        self.lock().snapshot()
    }

    pub fn state(&self) -> DraftState {
        self.lock().state()
    }

    pub fn readiness(&self) -> ReadinessReport {
        self.lock().readiness()
    }

    async fn follow_up(&self, events: &[DraftEvent]) -> AssessmentOutcome {
        if events.iter().any(DraftEvent::invalidates_assessment) {
            self.refresh_affordability().await
        } else {
            AssessmentOutcome::NotRequested
        }
    }

    fn execute(&self, command: DraftCommand) -> Result<Vec<DraftEvent>, DraftError> {
        self.lock().execute(&command)
    }

    fn lock(&self) -> MutexGuard<'_, DeductionDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
