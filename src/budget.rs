//! The budget arithmetic that drives the dashboard.
//!
//! There are no category budgets, forecasting or recurring transactions. The
//! whole model is: what is left in the pot, divided by the days until payday.

use time::Date;

use crate::{period::Period, transaction::Transaction};

/// The derived numbers shown on the dashboard for the current period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    /// The money left to spend for the rest of the period.
    pub total_remaining: f64,
    /// Whole days until the period's end date, never less than one.
    pub days_remaining: i64,
    /// `total_remaining` divided by `days_remaining`.
    pub daily_budget: f64,
}

/// Compute the budget summary for `period` given its transactions.
///
/// The total is the initial budget plus the rollover, plus money in and minus
/// money out. Days remaining is floored at one so that the daily budget is
/// defined even on the last day or when the period's end date has passed.
pub fn summarise(period: &Period, transactions: &[Transaction], today: Date) -> BudgetSummary {
    let total_remaining = period.initial_budget
        + period.rollover
        + transactions
            .iter()
            .map(Transaction::signed_amount)
            .sum::<f64>();

    let days_remaining = days_remaining(period.end_date, today);

    BudgetSummary {
        total_remaining,
        days_remaining,
        daily_budget: total_remaining / days_remaining as f64,
    }
}

/// Whole days from `today` until `end_date`, floored at one.
pub fn days_remaining(end_date: Date, today: Date) -> i64 {
    (end_date - today).whole_days().max(1)
}
