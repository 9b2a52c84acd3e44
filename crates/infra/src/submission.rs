use std::sync::Arc;

use tracing::{info, warn};

use paydesk_deductions::{DeductionRequest, NewDeductionRequest, ValidatedDraft};

use crate::context::InstitutionContext;
use crate::gateway::{DeductionRequestStore, GatewayError};

/// Turns a validated draft into a persisted deduction request.
///
/// Only accepts [`ValidatedDraft`], so nothing reaches the store without
/// passing the readiness guard first.
#[derive(Clone)]
pub struct SubmissionGateway {
    context: InstitutionContext,
    store: Arc<dyn DeductionRequestStore>,
}

impl SubmissionGateway {
    pub fn new(context: InstitutionContext, store: Arc<dyn DeductionRequestStore>) -> Self {
        Self { context, store }
    }

    pub async fn submit(&self, draft: ValidatedDraft) -> Result<DeductionRequest, GatewayError> {
        let payload = NewDeductionRequest::from_validated(draft, self.context.institution_id());

        match self.store.create(&payload).await {
            Ok(request) => {
                info!(
                    request_id = %request.id,
                    employee_id = %request.employee_id,
                    deduction_type = request.deduction_type.label(),
                    kind = request.kind_label(),
                    "deduction request created"
                );
                Ok(request)
            }
            Err(err) => {
                warn!(
                    employee_id = %payload.employee_id,
                    error = %err,
                    transient = err.is_transient(),
                    "deduction request rejected"
                );
                Err(err)
            }
        }
    }
}
