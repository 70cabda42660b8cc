use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calendar::{week_start, weekday_name};
use crate::models::Expense;
use crate::money::{percentage_of, saturating_sum};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DayComparison {
    pub(crate) day: NaiveDate,
    pub(crate) day_name: &'static str,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) this_week: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) last_week: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct WeeklyAnalysis {
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) total_change: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) average_daily_this_week: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) average_daily_last_week: Decimal,
    pub(crate) highest_day_this_week: DayComparison,
    pub(crate) highest_day_last_week: DayComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct WeeklyComparison {
    pub(crate) days: Vec<DayComparison>,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) this_week_total: Decimal,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) last_week_total: Decimal,
    #[serde(serialize_with = "crate::money::serialize_one_dp")]
    pub(crate) weekly_change: Decimal,
    pub(crate) analysis: WeeklyAnalysis,
    pub(crate) total_expenses_analyzed: usize,
}

/// Day-by-day comparison of the current Monday-based week with the previous one.
pub(crate) fn compute_weekly_comparison(
    now: NaiveDateTime,
    expenses: &[Expense],
) -> WeeklyComparison {
    let this_monday = week_start(now.date());
    let last_monday = this_monday - Duration::days(7);
    let spent_on = |date: NaiveDate| -> Decimal {
        saturating_sum(
            expenses
                .iter()
                .filter(|e| e.created_at.date() == date)
                .map(|e| e.amount),
        )
    };

    let days: Vec<DayComparison> = (0..7)
        .map(|offset| {
            let day = this_monday + Duration::days(offset);
            DayComparison {
                day,
                day_name: weekday_name(day.weekday()),
                this_week: spent_on(day),
                last_week: spent_on(last_monday + Duration::days(offset)),
            }
        })
        .collect();

    let this_week_total = saturating_sum(days.iter().map(|d| d.this_week));
    let last_week_total = saturating_sum(days.iter().map(|d| d.last_week));
    let weekly_change = percentage_of(
        this_week_total.saturating_sub(last_week_total),
        last_week_total,
    );

    let seven = Decimal::from(7);
    let analysis = WeeklyAnalysis {
        total_change: this_week_total - last_week_total,
        average_daily_this_week: this_week_total / seven,
        average_daily_last_week: last_week_total / seven,
        highest_day_this_week: highest(&days, |d| d.this_week),
        highest_day_last_week: highest(&days, |d| d.last_week),
    };

    tracing::debug!(%this_week_total, %last_week_total, "computed weekly comparison");

    WeeklyComparison {
        days,
        this_week_total,
        last_week_total,
        weekly_change,
        analysis,
        total_expenses_analyzed: expenses.len(),
    }
}

/// First row with the largest value; earlier days win ties.
fn highest(days: &[DayComparison], value: impl Fn(&DayComparison) -> Decimal) -> DayComparison {
    let mut best = &days[0];
    for day in &days[1..] {
        if value(day) > value(best) {
            best = day;
        }
    }
    best.clone()
}
