use serde::{Deserialize, Serialize};

use paydesk_core::InstitutionId;

/// Kind of institution operating the console.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionKind {
    Employer,
    Sacco,
    FinancialHub,
}

/// Acting-institution context for a wizard session.
///
/// Supplied by the caller at construction and immutable afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InstitutionContext {
    institution_id: InstitutionId,
    kind: InstitutionKind,
}

impl InstitutionContext {
    pub fn new(institution_id: InstitutionId, kind: InstitutionKind) -> Self {
        Self {
            institution_id,
            kind,
        }
    }

    pub fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }

    pub fn kind(&self) -> InstitutionKind {
        self.kind
    }

    /// Employers only see their own staff; SACCOs and hubs serve members
    /// across employers.
    pub fn can_see(&self, employer_institution_id: InstitutionId) -> bool {
        match self.kind {
            InstitutionKind::Employer => self.institution_id == employer_institution_id,
            InstitutionKind::Sacco | InstitutionKind::FinancialHub => true,
        }
    }
}
