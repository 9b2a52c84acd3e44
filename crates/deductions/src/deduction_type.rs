use core::str::FromStr;

use serde::{Deserialize, Serialize};

use paydesk_core::DomainError;

/// Kind of salary deduction being requested.
///
/// `Unselected` is the form's initial value. It never parses from a wire code
/// and cannot be serialised on its own, so it cannot leak into a submission.
/// Draft-side fields use [`selection`] to carry it as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    #[default]
    #[serde(skip)]
    Unselected,
    Share,
    LoanRepayment,
    Fine,
    Insurance,
    Other,
}

impl DeductionType {
    /// Every selectable type, in display order.
    pub const ALL: [DeductionType; 5] = [
        DeductionType::Share,
        DeductionType::LoanRepayment,
        DeductionType::Fine,
        DeductionType::Insurance,
        DeductionType::Other,
    ];

    pub fn is_selected(&self) -> bool {
        !matches!(self, DeductionType::Unselected)
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            DeductionType::Unselected => None,
            DeductionType::Share => Some("SHARE"),
            DeductionType::LoanRepayment => Some("LOAN_REPAYMENT"),
            DeductionType::Fine => Some("FINE"),
            DeductionType::Insurance => Some("INSURANCE"),
            DeductionType::Other => Some("OTHER"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeductionType::Unselected => "Select a deduction type",
            DeductionType::Share => "Share contribution",
            DeductionType::LoanRepayment => "Loan repayment",
            DeductionType::Fine => "Fine",
            DeductionType::Insurance => "Insurance premium",
            DeductionType::Other => "Other",
        }
    }
}

impl FromStr for DeductionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        DeductionType::ALL
            .into_iter()
            .find(|t| t.code().is_some_and(|c| c.eq_ignore_ascii_case(code)))
            .ok_or_else(|| DomainError::validation(format!("unknown deduction type: {code:?}")))
    }
}

/// Serde adapter for form fields that may still hold `Unselected`.
///
/// `Unselected` is written as `null` and `null` reads back as `Unselected`.
pub mod selection {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::DeductionType;

    pub fn serialize<S>(value: &DeductionType, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.is_selected().then_some(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DeductionType, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<DeductionType>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_codes() {
        assert_eq!("LOAN_REPAYMENT".parse::<DeductionType>().unwrap(), DeductionType::LoanRepayment);
        assert_eq!("share".parse::<DeductionType>().unwrap(), DeductionType::Share);
    }

    #[test]
    fn sentinel_values_do_not_parse() {
        assert!("".parse::<DeductionType>().is_err());
        assert!("no-types".parse::<DeductionType>().is_err());
        assert!("UNSELECTED".parse::<DeductionType>().is_err());
    }

    #[test]
    fn unselected_cannot_be_serialised() {
        assert!(serde_json::to_string(&DeductionType::Unselected).is_err());
        assert_eq!(serde_json::to_string(&DeductionType::Fine).unwrap(), "\"FINE\"");
    }

    #[test]
    fn all_excludes_unselected() {
        assert!(DeductionType::ALL.iter().all(DeductionType::is_selected));
        assert_eq!(DeductionType::default(), DeductionType::Unselected);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Field {
        #[serde(with = "selection")]
        deduction_type: DeductionType,
    }

    #[test]
    fn selection_writes_unselected_as_null() {
        let unselected = Field {
            deduction_type: DeductionType::Unselected,
        };
        let json = serde_json::to_string(&unselected).unwrap();
        assert_eq!(json, r#"{"deduction_type":null}"#);
        assert_eq!(serde_json::from_str::<Field>(&json).unwrap(), unselected);

        let fine = Field {
            deduction_type: DeductionType::Fine,
        };
        let json = serde_json::to_string(&fine).unwrap();
        assert_eq!(json, r#"{"deduction_type":"FINE"}"#);
        assert_eq!(serde_json::from_str::<Field>(&json).unwrap(), fine);
    }
}
