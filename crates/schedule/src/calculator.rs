use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use paydesk_core::{DomainError, DomainResult, ValueObject};

/// Decimal places of the currency's minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Advance `start` by `months` calendar months.
///
/// Returns `None` for a non-positive count (callers keep any prior end date)
/// or when the result falls outside chrono's date range. Day-of-month is kept
/// where it exists and clamped to the month's last day otherwise, so
/// 2025-01-31 + 1 month is 2025-02-28.
pub fn compute_schedule(start: NaiveDate, months: i64) -> Option<NaiveDate> {
    if months <= 0 {
        return None;
    }
    let months = u32::try_from(months).ok()?;
    start.checked_add_months(Months::new(months))
}

/// Sum of all installments: `amount * months`, at minor-unit precision.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn compute_maturity_total(amount: Decimal, months: u32) -> Option<Decimal> {
    let total = amount.checked_mul(Decimal::from(months))?;
    Some(total.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// One monthly deduction occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position in the plan.
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// Full installment plan for a deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub installment_amount: Decimal,
    pub maturity_total: Decimal,
    pub installments: Vec<Installment>,
}

impl ValueObject for InstallmentSchedule {}

impl InstallmentSchedule {
    /// Build the plan. Installment `k` falls due `k - 1` months after the
    /// start; each date is derived from the start date, never chained, so
    /// clamped month-ends do not drift.
    pub fn build(start_date: NaiveDate, months: u32, amount: Decimal) -> DomainResult<Self> {
        if months == 0 {
            return Err(DomainError::validation(
                "number of installments must be at least 1",
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount must be greater than zero"));
        }

        let end_date = compute_schedule(start_date, i64::from(months))
            .ok_or_else(|| DomainError::validation("schedule ends outside the supported calendar"))?;
        let maturity_total = compute_maturity_total(amount, months)
            .ok_or_else(|| DomainError::validation("amount is too large"))?;

        let installment_amount =
            amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);

        let mut installments = Vec::with_capacity(months as usize);
        for offset in 0..months {
            let due_date = start_date
                .checked_add_months(Months::new(offset))
                .ok_or_else(|| DomainError::validation("installment falls outside the supported calendar"))?;
            installments.push(Installment {
                sequence: offset + 1,
                due_date,
                amount: installment_amount,
            });
        }

        Ok(Self {
            start_date,
            end_date,
            installment_amount,
            maturity_total,
            installments,
        })
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    /// Due date of the final installment (one month before `end_date`).
    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|i| i.due_date)
    }
}
