use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calendar::{weekday_name, MonthWindow};
use super::{sum, totals_by_category};
use crate::models::{Expense, ExpenseCategory, ExpenseStatus};
use crate::money::percentage_of;

const TOP_CATEGORY_COUNT: usize = 5;
const RECENT_EXPENSE_COUNT: usize = 10;
const DAILY_TREND_DAYS: i64 = 30;
const MONTHLY_TREND_MONTHS: u32 = 12;

const HIGH_AMOUNT_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
const CATEGORY_SPEND_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
const PENDING_THRESHOLD: usize = 5;

// ── Overview ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct OverviewTotals {
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_expenses: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) this_month_total: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) last_month_total: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) month_change_percent: Decimal,
    pub(crate) total_transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryTotal {
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total: Decimal,
    pub(crate) count: usize,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StatusCount {
    pub(crate) status: ExpenseStatus,
    pub(crate) count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryAmount {
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Overview {
    #[serde(rename = "overview")]
    pub(crate) totals: OverviewTotals,
    pub(crate) category_breakdown: Vec<CategoryTotal>,
    pub(crate) status_breakdown: Vec<StatusCount>,
    pub(crate) top_categories: Vec<CategoryAmount>,
    pub(crate) recent_expenses: Vec<Expense>,
}

pub(crate) fn compute_overview(now: NaiveDateTime, expenses: &[Expense]) -> Overview {
    let this_month = MonthWindow::containing(now);
    let last_month = this_month.previous();

    let in_this_month = |e: &&Expense| this_month.contains(e.created_at);

    let total_expenses = sum(expenses);
    let this_month_total = sum(expenses.iter().filter(in_this_month));
    let last_month_total = sum(
        expenses
            .iter()
            .filter(|e| e.created_at >= last_month.start && e.created_at < this_month.start),
    );

    let month_change_percent = if last_month_total > Decimal::ZERO {
        percentage_of(
            this_month_total.saturating_sub(last_month_total),
            last_month_total,
        )
    } else if this_month_total > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let category_breakdown = totals_by_category(expenses)
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total,
            count,
            percentage: percentage_of(total, total_expenses),
        })
        .collect();

    let status_breakdown = ExpenseStatus::all()
        .iter()
        .filter_map(|&status| {
            let count = expenses.iter().filter(|e| e.status == status).count();
            (count > 0).then_some(StatusCount { status, count })
        })
        .collect();

    let mut top_categories: Vec<CategoryAmount> =
        totals_by_category(expenses.iter().filter(in_this_month))
            .into_iter()
            .map(|(category, (total, _))| CategoryAmount { category, total })
            .collect();
    // stable sort keeps category order among equal totals
    top_categories.sort_by_key(|c| Reverse(c.total));
    top_categories.truncate(TOP_CATEGORY_COUNT);

    let mut recent_expenses = expenses.to_vec();
    recent_expenses.sort_by_key(|e| Reverse((e.created_at, e.id)));
    recent_expenses.truncate(RECENT_EXPENSE_COUNT);

    tracing::debug!(%total_expenses, %this_month_total, %last_month_total, "computed overview");

    Overview {
        totals: OverviewTotals {
            total_expenses,
            this_month_total,
            last_month_total,
            month_change_percent,
            total_transactions: expenses.len(),
        },
        category_breakdown,
        status_breakdown,
        top_categories,
        recent_expenses,
    }
}

// ── Trends ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DailyTotal {
    pub(crate) date: NaiveDate,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MonthlyTotal {
    pub(crate) year: i32,
    pub(crate) month: u32,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total: Decimal,
    pub(crate) count: usize,
}

impl MonthlyTotal {
    pub(crate) fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryAverage {
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) average: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct WeekdayTotal {
    /// Sunday is 0.
    pub(crate) day_number: u32,
    pub(crate) day_name: &'static str,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total: Decimal,
    pub(crate) count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Trends {
    pub(crate) daily: Vec<DailyTotal>,
    pub(crate) monthly: Vec<MonthlyTotal>,
    pub(crate) average_by_category: Vec<CategoryAverage>,
    pub(crate) weekday_pattern: Vec<WeekdayTotal>,
}

pub(crate) fn compute_trends(now: NaiveDateTime, expenses: &[Expense]) -> Trends {
    let daily_since = now - Duration::days(DAILY_TREND_DAYS);
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for e in expenses.iter().filter(|e| e.created_at >= daily_since) {
        let total = daily.entry(e.created_at.date()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(e.amount);
    }

    let current = MonthWindow::containing(now);
    let monthly_since = current
        .start
        .checked_sub_months(Months::new(MONTHLY_TREND_MONTHS - 1))
        .unwrap_or(NaiveDateTime::MIN);
    let mut monthly: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();
    for e in expenses
        .iter()
        .filter(|e| e.created_at >= monthly_since && e.created_at <= current.end)
    {
        let entry = monthly
            .entry((e.created_at.year(), e.created_at.month()))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(e.amount);
        entry.1 += 1;
    }

    let average_by_category = totals_by_category(expenses)
        .into_iter()
        .map(|(category, (total, count))| CategoryAverage {
            category,
            average: total / Decimal::from(count),
        })
        .collect();

    let mut weekdays: BTreeMap<u32, (Decimal, usize, &'static str)> = BTreeMap::new();
    for e in expenses {
        let weekday = e.created_at.weekday();
        let entry = weekdays
            .entry(weekday.num_days_from_sunday())
            .or_insert((Decimal::ZERO, 0, weekday_name(weekday)));
        entry.0 = entry.0.saturating_add(e.amount);
        entry.1 += 1;
    }

    Trends {
        daily: daily
            .into_iter()
            .map(|(date, total)| DailyTotal { date, total })
            .collect(),
        monthly: monthly
            .into_iter()
            .map(|((year, month), (total, count))| MonthlyTotal {
                year,
                month,
                total,
                count,
            })
            .collect(),
        average_by_category,
        weekday_pattern: weekdays
            .into_iter()
            .map(|(day_number, (total, count, day_name))| WeekdayTotal {
                day_number,
                day_name,
                total,
                count,
            })
            .collect(),
    }
}

// ── Alerts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AlertKind {
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AlertPriority {
    Low,
    Medium,
    High,
}

impl AlertPriority {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Alert {
    #[serde(rename = "type")]
    pub(crate) kind: AlertKind,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) priority: AlertPriority,
}

/// Advisory notices: large expenses this month, heavy categories this month,
/// and a backlog of pending approvals. Each check is independent.
pub(crate) fn compute_alerts(now: NaiveDateTime, expenses: &[Expense]) -> Vec<Alert> {
    let month = MonthWindow::containing(now);
    let mut alerts = Vec::new();

    let high_amount = expenses
        .iter()
        .filter(|e| month.contains(e.created_at) && e.amount > HIGH_AMOUNT_THRESHOLD)
        .count();
    if high_amount > 0 {
        alerts.push(Alert {
            kind: AlertKind::Warning,
            title: "High Amount Expenses".into(),
            message: format!("{high_amount} expenses over ${HIGH_AMOUNT_THRESHOLD} this month"),
            priority: AlertPriority::Medium,
        });
    }

    for (category, (total, _)) in
        totals_by_category(expenses.iter().filter(|e| month.contains(e.created_at)))
    {
        if total > CATEGORY_SPEND_THRESHOLD {
            alerts.push(Alert {
                kind: AlertKind::Info,
                title: format!("High {} Spending", category.title()),
                message: format!("${total:.2} spent on {category} this month"),
                priority: AlertPriority::Low,
            });
        }
    }

    let pending = expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Pending)
        .count();
    if pending > PENDING_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::Warning,
            title: "Pending Approvals".into(),
            message: format!("{pending} expenses waiting for approval"),
            priority: AlertPriority::High,
        });
    }

    tracing::debug!(count = alerts.len(), "computed alerts");
    alerts
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
