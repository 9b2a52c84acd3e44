use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::{EmployeeId, Entity, InstitutionId};

/// Employment status as reported by the employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    Active,
    OnLeave,
    Suspended,
    Terminated,
}

/// Employee/member record resolved through the external directory.
///
/// Read-only here: the deduction workflow selects employees, it never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub display_name: String,
    pub employee_number: String,
    pub national_id: String,
    pub employer_institution_id: InstitutionId,
    pub basic_salary: Option<Decimal>,
    pub employment_status: EmploymentStatus,
}

impl Employee {
    /// Case-insensitive match on national ID or employee number.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty()
            && (self.national_id.eq_ignore_ascii_case(query)
                || self.employee_number.eq_ignore_ascii_case(query))
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
