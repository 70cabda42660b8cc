use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calendar::MonthWindow;
use super::{sum, totals_by_category};
use crate::models::{BudgetLimit, Expense, ExpenseCategory};
use crate::money::{percentage_of, saturating_sum};

/// Share of the total budget that may be spent before the month leaves "on track".
const ON_TRACK_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const WARNING_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

// ── Safe to spend ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Recommendation {
    OnTrack,
    Caution,
    OverBudget,
}

impl Recommendation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::Caution => "caution",
            Self::OverBudget => "over_budget",
        }
    }

    fn classify(total_spent: Decimal, total_budget: Decimal) -> Self {
        if total_spent <= total_budget.saturating_mul(ON_TRACK_RATIO) {
            Self::OnTrack
        } else if total_spent > total_budget {
            Self::OverBudget
        } else {
            Self::Caution
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryStatus {
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) limit: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) spent: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) remaining: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) over_budget: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) percentage_used: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SafeToSpend {
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_budget: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_spent: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_remaining: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) discretionary_remaining: Decimal,
    pub(crate) days_left_in_month: i64,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) daily_safe_amount: Decimal,
    pub(crate) budget_status: Vec<CategoryStatus>,
    pub(crate) recommendation: Recommendation,
}

/// Per-category budget status and the discretionary amount that can still be
/// spent per remaining day of `now`'s month.
///
/// `total_spent` covers every category spent in this month, including ones
/// without a limit, while `budget_status` and `total_remaining` only cover
/// categories that have a limit.
pub(crate) fn compute_safe_to_spend(
    now: NaiveDateTime,
    limits: &[BudgetLimit],
    expenses: &[Expense],
) -> SafeToSpend {
    let month = MonthWindow::containing(now);
    let spent_by_category =
        totals_by_category(expenses.iter().filter(|e| month.contains(e.created_at)));
    let spent_in = |c: ExpenseCategory| spent_by_category.get(&c).map_or(Decimal::ZERO, |t| t.0);

    let budget_status: Vec<CategoryStatus> = limits
        .iter()
        .map(|l| {
            let spent = spent_in(l.category);
            CategoryStatus {
                category: l.category,
                limit: l.monthly_limit,
                spent,
                remaining: l.monthly_limit.saturating_sub(spent).max(Decimal::ZERO),
                over_budget: spent.saturating_sub(l.monthly_limit).max(Decimal::ZERO),
                percentage_used: percentage_of(spent, l.monthly_limit),
            }
        })
        .collect();

    let total_budget = saturating_sum(limits.iter().map(|l| l.monthly_limit));
    let total_spent = saturating_sum(spent_by_category.values().map(|t| t.0));
    let total_remaining = saturating_sum(budget_status.iter().map(|s| s.remaining));

    let discretionary_remaining = saturating_sum(
        budget_status
            .iter()
            .filter(|s| ExpenseCategory::discretionary().contains(&s.category))
            .map(|s| s.remaining),
    );

    let days_left_in_month = (month.end.date() - now.date()).num_days() + 1;
    let daily_safe_amount = discretionary_remaining / Decimal::from(days_left_in_month.max(1));
    let recommendation = Recommendation::classify(total_spent, total_budget);

    tracing::debug!(
        %total_budget,
        %total_spent,
        %discretionary_remaining,
        days_left_in_month,
        %recommendation,
        "computed safe to spend"
    );

    SafeToSpend {
        total_budget,
        total_spent,
        total_remaining,
        discretionary_remaining,
        days_left_in_month,
        daily_safe_amount,
        budget_status,
        recommendation,
    }
}

// ── Budget health ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum HealthStatus {
    Good,
    Warning,
    Over,
}

impl HealthStatus {
    fn from_percentage(percentage: Decimal) -> Self {
        if percentage > Decimal::ONE_HUNDRED {
            Self::Over
        } else if percentage > WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Good
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryHealth {
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) limit: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) spent: Decimal,
    /// Negative once the category is over its limit.
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) remaining: Decimal,
    #[serde(serialize_with = "crate::money::serialize_one_dp")]
    pub(crate) percentage: Decimal,
    pub(crate) status: HealthStatus,
    pub(crate) is_over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct HealthSummary {
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_budget: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_spent: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_remaining: Decimal,
    #[serde(serialize_with = "crate::money::serialize_one_dp")]
    pub(crate) overall_health: Decimal,
    pub(crate) healthy_categories: usize,
    pub(crate) warning_categories: usize,
    pub(crate) over_budget_categories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BudgetHealth {
    pub(crate) categories: Vec<CategoryHealth>,
    pub(crate) summary: HealthSummary,
}

pub(crate) fn compute_budget_health(
    now: NaiveDateTime,
    limits: &[BudgetLimit],
    expenses: &[Expense],
) -> BudgetHealth {
    let month = MonthWindow::containing(now);
    let spent_by_category =
        totals_by_category(expenses.iter().filter(|e| month.contains(e.created_at)));

    let categories: Vec<CategoryHealth> = limits
        .iter()
        .map(|l| {
            let spent = spent_by_category
                .get(&l.category)
                .map_or(Decimal::ZERO, |t| t.0);
            let percentage = percentage_of(spent, l.monthly_limit);
            let status = HealthStatus::from_percentage(percentage);
            CategoryHealth {
                category: l.category,
                limit: l.monthly_limit,
                spent,
                remaining: l.monthly_limit.saturating_sub(spent),
                percentage,
                status,
                is_over_budget: status == HealthStatus::Over,
            }
        })
        .collect();

    let total_budget = saturating_sum(categories.iter().map(|c| c.limit));
    let total_spent = saturating_sum(categories.iter().map(|c| c.spent));
    let total_remaining = total_budget.saturating_sub(total_spent);
    let overall_health = if total_budget > Decimal::ZERO {
        percentage_of(total_remaining, total_budget)
    } else {
        Decimal::ONE_HUNDRED
    };
    let count = |status: HealthStatus| categories.iter().filter(|c| c.status == status).count();

    let summary = HealthSummary {
        total_budget,
        total_spent,
        total_remaining,
        overall_health,
        healthy_categories: count(HealthStatus::Good),
        warning_categories: count(HealthStatus::Warning),
        over_budget_categories: count(HealthStatus::Over),
    };

    tracing::debug!(
        %overall_health,
        over = summary.over_budget_categories,
        "computed budget health"
    );

    BudgetHealth {
        categories,
        summary,
    }
}

// ── Month projection ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SpendingTrend {
    AboveAverage,
    BelowAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BudgetAnalysis {
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) current_month_spending: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) daily_average: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) projected_month_end: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) three_month_average: Decimal,
    pub(crate) days_in_month: u32,
    pub(crate) current_day: u32,
    pub(crate) spending_trend: SpendingTrend,
}

/// Extrapolate this month's spending from the daily average so far and
/// compare it with the monthly average of the preceding ~90 days.
pub(crate) fn compute_budget_analysis(now: NaiveDateTime, expenses: &[Expense]) -> BudgetAnalysis {
    let month = MonthWindow::containing(now);
    let current_month_spending = sum(expenses.iter().filter(|e| month.contains(e.created_at)));
    let current_day = now.day();
    let days_in_month = month.days();

    let daily_average = current_month_spending / Decimal::from(current_day.max(1));
    let projected_month_end = daily_average.saturating_mul(Decimal::from(days_in_month));

    let lookback_start = month.start - Duration::days(90);
    let mut monthly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for e in expenses
        .iter()
        .filter(|e| e.created_at >= lookback_start && e.created_at < month.start)
    {
        let total = monthly
            .entry((e.created_at.year(), e.created_at.month()))
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(e.amount);
    }
    let three_month_average = if monthly.is_empty() {
        Decimal::ZERO
    } else {
        saturating_sum(monthly.values().copied()) / Decimal::from(monthly.len())
    };

    let spending_trend = if projected_month_end > three_month_average {
        SpendingTrend::AboveAverage
    } else {
        SpendingTrend::BelowAverage
    };

    tracing::debug!(%projected_month_end, %three_month_average, "computed budget analysis");

    BudgetAnalysis {
        current_month_spending,
        daily_average,
        projected_month_end,
        three_month_average,
        days_in_month,
        current_day,
        spending_trend,
    }
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
