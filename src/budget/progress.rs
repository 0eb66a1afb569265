//! Compares a budget against what was actually spent in its month.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use time::{Date, Month};

use crate::amount::{cents_to_decimal, cents_to_f64};

/// What has been spent against a budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetProgress {
    /// The total of the matching expenses in the budget's month.
    pub actual_expenses: f64,
    /// The budget amount minus the actual expenses, negative when over budget.
    pub remaining: f64,
    /// The actual expenses as a percentage of the budget amount, rounded to two places.
    pub percentage_used: f64,
}

/// The half-open date range `[first of month, first of next month)` of a budget.
///
/// Returns `None` if `month` is not a valid month or the dates are out of range.
pub fn budget_period(month: u8, year: u16) -> Option<(Date, Date)> {
    let month = Month::try_from(month).ok()?;
    let start = Date::from_calendar_date(i32::from(year), month, 1).ok()?;

    let (next_year, next_month) = match month {
        Month::December => (i32::from(year) + 1, Month::January),
        month => (i32::from(year), month.next()),
    };
    let end = Date::from_calendar_date(next_year, next_month, 1).ok()?;

    Some((start, end))
}

/// Compute the progress of a budget of `amount_cents` given `actual_cents` spent.
///
/// The percentage is 0.0 when the amount is not positive.
pub fn compute_progress(amount_cents: i64, actual_cents: i64) -> BudgetProgress {
    let percentage_used = if amount_cents > 0 {
        (Decimal::from(actual_cents) / Decimal::from(amount_cents) * Decimal::ONE_HUNDRED)
            .round_dp(2)
            .to_f64()
            .unwrap_or_default()
    } else {
        0.0
    };

    BudgetProgress {
        actual_expenses: cents_to_f64(actual_cents),
        remaining: cents_to_decimal(amount_cents - actual_cents)
            .to_f64()
            .unwrap_or_default(),
        percentage_used,
    }
}
