//! Installment schedule calculator.
//!
//! Pure functions deriving the end date and maturity total of a deduction
//! from its start date, monthly amount, and installment count. Everything
//! here is referentially transparent and cheap enough to run per keystroke.

pub mod calculator;
pub mod input;

pub use calculator::{
    Installment, InstallmentSchedule, compute_maturity_total, compute_schedule,
    MINOR_UNIT_SCALE,
};
pub use input::{parse_amount, parse_installments};
