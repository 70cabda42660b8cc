//! Pure report computations over a snapshot of expenses and budget limits.
//!
//! Every function takes the current time explicitly and performs no I/O, so
//! the same snapshot and `now` always give the same result.

mod budget;
mod calendar;
mod dashboard;
mod weekly;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{Expense, ExpenseCategory};
use crate::money::saturating_sum;

pub(crate) use budget::{
    compute_budget_analysis, compute_budget_health, compute_safe_to_spend, BudgetHealth,
    CategoryHealth, HealthStatus, Recommendation, SafeToSpend,
};
pub(crate) use calendar::MonthWindow;
pub(crate) use dashboard::{
    compute_alerts, compute_overview, compute_trends, Alert, AlertPriority, Overview, Trends,
};
pub(crate) use weekly::compute_weekly_comparison;

/// Sum and count per category, in category order.
fn totals_by_category<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
) -> BTreeMap<ExpenseCategory, (Decimal, usize)> {
    let mut totals: BTreeMap<ExpenseCategory, (Decimal, usize)> = BTreeMap::new();
    for e in expenses {
        let entry = totals.entry(e.category).or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(e.amount);
        entry.1 += 1;
    }
    totals
}

fn sum<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Decimal {
    saturating_sum(expenses.into_iter().map(|e| e.amount))
}

#[cfg(test)]
#[path = "test_support.rs"]
mod test_support;
