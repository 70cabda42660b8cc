#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::engine::test_support::{dt, expense, limit, noon};
use crate::models::ExpenseCategory::{Marketing, Meals, Office, Other, Software, Travel, Utilities};

fn worked_example() -> (Vec<BudgetLimit>, Vec<Expense>) {
    let limits = vec![limit(Meals, dec!(400)), limit(Travel, dec!(100))];
    let expenses = vec![
        expense(Meals, dec!(150), noon(2024, 3, 2)),
        expense(Travel, dec!(120), noon(2024, 3, 5)),
        expense(Software, dec!(30), noon(2024, 3, 9)),
    ];
    (limits, expenses)
}

fn status_for(result: &SafeToSpend, category: ExpenseCategory) -> &CategoryStatus {
    result
        .budget_status
        .iter()
        .find(|s| s.category == category)
        .unwrap()
}

// ── Safe to spend ─────────────────────────────────────────────

#[test]
fn test_worked_example() {
    let (limits, expenses) = worked_example();
    let result = compute_safe_to_spend(noon(2024, 3, 15), &limits, &expenses);

    let meals = status_for(&result, Meals);
    assert_eq!(meals.spent, dec!(150));
    assert_eq!(meals.remaining, dec!(250));
    assert_eq!(meals.over_budget, Decimal::ZERO);
    assert_eq!(meals.percentage_used, dec!(37.5));

    let travel = status_for(&result, Travel);
    assert_eq!(travel.spent, dec!(120));
    assert_eq!(travel.remaining, Decimal::ZERO);
    assert_eq!(travel.over_budget, dec!(20));
    assert_eq!(travel.percentage_used, dec!(120));

    assert_eq!(result.total_budget, dec!(500));
    assert_eq!(result.total_spent, dec!(300));
    assert_eq!(result.total_remaining, dec!(250));
    assert_eq!(result.discretionary_remaining, dec!(250));
    assert_eq!(result.days_left_in_month, 17);
    assert_eq!(result.daily_safe_amount, dec!(250) / dec!(17));
    assert_eq!(result.recommendation, Recommendation::OnTrack);
}

#[test]
fn test_status_follows_limit_order() {
    let (mut limits, expenses) = worked_example();
    limits.reverse();
    let result = compute_safe_to_spend(noon(2024, 3, 15), &limits, &expenses);
    let order: Vec<_> = result.budget_status.iter().map(|s| s.category).collect();
    assert_eq!(order, vec![Travel, Meals]);
}

#[test]
fn test_month_boundaries_inclusive() {
    let limits = vec![limit(Meals, dec!(1000))];
    let expenses = vec![
        expense(Meals, dec!(1), dt(2024, 4, 1, 0, 0, 0)),
        expense(Meals, dec!(2), dt(2024, 4, 30, 23, 59, 59)),
        expense(Meals, dec!(40), dt(2024, 3, 31, 23, 59, 59)),
        expense(Meals, dec!(80), dt(2024, 5, 1, 0, 0, 0)),
    ];
    let result = compute_safe_to_spend(noon(2024, 4, 10), &limits, &expenses);
    assert_eq!(result.total_spent, dec!(3));
    assert_eq!(status_for(&result, Meals).spent, dec!(3));
}

#[test]
fn test_empty_inputs() {
    let result = compute_safe_to_spend(noon(2024, 3, 15), &[], &[]);
    assert_eq!(result.total_budget, Decimal::ZERO);
    assert_eq!(result.total_spent, Decimal::ZERO);
    assert_eq!(result.discretionary_remaining, Decimal::ZERO);
    assert_eq!(result.daily_safe_amount, Decimal::ZERO);
    assert!(result.budget_status.is_empty());
    assert_eq!(result.recommendation, Recommendation::OnTrack);
}

#[test]
fn test_zero_limit_percentage_is_zero() {
    let limits = vec![limit(Utilities, Decimal::ZERO)];
    let expenses = vec![expense(Utilities, dec!(50), noon(2024, 3, 3))];
    let result = compute_safe_to_spend(noon(2024, 3, 15), &limits, &expenses);
    let s = status_for(&result, Utilities);
    assert_eq!(s.percentage_used, Decimal::ZERO);
    assert_eq!(s.over_budget, dec!(50));
    assert_eq!(result.recommendation, Recommendation::OverBudget);
}

fn unchecked_limit(category: ExpenseCategory, monthly_limit: Decimal) -> BudgetLimit {
    BudgetLimit {
        id: None,
        category,
        monthly_limit,
    }
}

#[test]
fn test_tiny_limit_saturates_percentage() {
    let limits = vec![unchecked_limit(Meals, dec!(0.0000000000000000000000000001))];
    let expenses = vec![expense(Meals, dec!(1000), noon(2024, 3, 10))];
    let now = noon(2024, 3, 15);

    let result = compute_safe_to_spend(now, &limits, &expenses);
    let s = status_for(&result, Meals);
    assert_eq!(s.percentage_used, Decimal::MAX);
    assert_eq!(s.remaining, Decimal::ZERO);
    assert_eq!(result.recommendation, Recommendation::OverBudget);

    let health = compute_budget_health(now, &limits, &expenses);
    assert_eq!(health.categories[0].status, HealthStatus::Over);
    assert_eq!(health.summary.overall_health, Decimal::MIN);
}

#[test]
fn test_huge_limits_saturate_totals() {
    let limits = vec![
        unchecked_limit(Meals, Decimal::MAX),
        unchecked_limit(Travel, Decimal::MAX),
    ];
    let expenses = vec![expense(Meals, dec!(25), noon(2024, 3, 10))];
    let now = noon(2024, 3, 15);

    let result = compute_safe_to_spend(now, &limits, &expenses);
    assert_eq!(result.total_budget, Decimal::MAX);
    assert_eq!(result.total_remaining, Decimal::MAX);
    assert_eq!(result.recommendation, Recommendation::OnTrack);

    let health = compute_budget_health(now, &limits, &expenses);
    assert_eq!(health.summary.total_budget, Decimal::MAX);
    assert_eq!(health.summary.healthy_categories, 2);
}

#[test]
fn test_last_day_of_month() {
    let limits = vec![limit(Other, dec!(90)), limit(Marketing, dec!(10))];
    let result = compute_safe_to_spend(dt(2024, 2, 29, 23, 0, 0), &limits, &[]);
    assert_eq!(result.days_left_in_month, 1);
    assert_eq!(result.daily_safe_amount, dec!(100));
    assert!(
        result.daily_safe_amount * Decimal::from(result.days_left_in_month)
            <= result.discretionary_remaining
    );
}

#[test]
fn test_first_day_of_month() {
    let limits = vec![limit(Meals, dec!(310))];
    let result = compute_safe_to_spend(dt(2024, 1, 1, 0, 0, 0), &limits, &[]);
    assert_eq!(result.days_left_in_month, 31);
    assert_eq!(result.daily_safe_amount, dec!(10));
}

#[test]
fn test_discretionary_only_limited_categories() {
    let limits = vec![limit(Meals, dec!(100)), limit(Software, dec!(500))];
    let expenses = vec![
        expense(Other, dec!(70), noon(2024, 3, 1)),
        expense(Meals, dec!(130), noon(2024, 3, 1)),
    ];
    let result = compute_safe_to_spend(noon(2024, 3, 20), &limits, &expenses);
    // meals is over, software is not discretionary, other has no limit
    assert_eq!(result.discretionary_remaining, Decimal::ZERO);
    assert_eq!(result.total_spent, dec!(200));
}

#[test]
fn test_recommendation_thresholds() {
    let limits = vec![limit(Office, dec!(100))];
    let at = noon(2024, 3, 15);
    let with = |amount: Decimal| vec![expense(Office, amount, noon(2024, 3, 1))];

    assert_eq!(
        compute_safe_to_spend(at, &limits, &with(dec!(80))).recommendation,
        Recommendation::OnTrack
    );
    assert_eq!(
        compute_safe_to_spend(at, &limits, &with(dec!(80.01))).recommendation,
        Recommendation::Caution
    );
    assert_eq!(
        compute_safe_to_spend(at, &limits, &with(dec!(100))).recommendation,
        Recommendation::Caution
    );
    assert_eq!(
        compute_safe_to_spend(at, &limits, &with(dec!(100.01))).recommendation,
        Recommendation::OverBudget
    );
}

#[test]
fn test_safe_to_spend_is_idempotent() {
    let (limits, expenses) = worked_example();
    let now = noon(2024, 3, 15);
    assert_eq!(
        compute_safe_to_spend(now, &limits, &expenses),
        compute_safe_to_spend(now, &limits, &expenses)
    );
}

#[test]
fn test_safe_to_spend_json_shape() {
    let (limits, expenses) = worked_example();
    let result = compute_safe_to_spend(noon(2024, 3, 15), &limits, &expenses);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["total_spent"], serde_json::json!(300.0));
    assert_eq!(json["daily_safe_amount"], serde_json::json!(14.71));
    assert_eq!(json["recommendation"], "on_track");
    assert_eq!(json["budget_status"][1]["category"], "travel");
}

// ── Budget health ─────────────────────────────────────────────

#[test]
fn test_budget_health_statuses() {
    let limits = vec![
        limit(Meals, dec!(100)),
        limit(Travel, dec!(100)),
        limit(Software, dec!(100)),
    ];
    let expenses = vec![
        expense(Meals, dec!(50), noon(2024, 3, 2)),
        expense(Travel, dec!(85), noon(2024, 3, 2)),
        expense(Software, dec!(130), noon(2024, 3, 2)),
        expense(Office, dec!(999), noon(2024, 3, 2)),
    ];
    let health = compute_budget_health(noon(2024, 3, 15), &limits, &expenses);

    let statuses: Vec<_> = health.categories.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            HealthStatus::Good,
            HealthStatus::Warning,
            HealthStatus::Over,
        ]
    );
    assert_eq!(health.categories[2].remaining, dec!(-30));
    assert!(health.categories[2].is_over_budget);
    assert!(!health.categories[1].is_over_budget);

    // unlimited categories are left out of the summary
    assert_eq!(health.summary.total_spent, dec!(265));
    assert_eq!(health.summary.total_remaining, dec!(35));
    assert_eq!(health.summary.healthy_categories, 1);
    assert_eq!(health.summary.warning_categories, 1);
    assert_eq!(health.summary.over_budget_categories, 1);
}

#[test]
fn test_budget_health_exact_thresholds() {
    let limits = vec![limit(Meals, dec!(100)), limit(Travel, dec!(100))];
    let expenses = vec![
        expense(Meals, dec!(80), noon(2024, 3, 2)),
        expense(Travel, dec!(100), noon(2024, 3, 2)),
    ];
    let health = compute_budget_health(noon(2024, 3, 15), &limits, &expenses);
    assert_eq!(health.categories[0].status, HealthStatus::Good);
    assert_eq!(health.categories[1].status, HealthStatus::Warning);
}

#[test]
fn test_budget_health_no_budget() {
    let health = compute_budget_health(noon(2024, 3, 15), &[], &[]);
    assert_eq!(health.summary.overall_health, Decimal::ONE_HUNDRED);
    assert!(health.categories.is_empty());
}

#[test]
fn test_budget_health_rounds_percentages() {
    let limits = vec![limit(Meals, dec!(300))];
    let expenses = vec![expense(Meals, dec!(100), noon(2024, 3, 2))];
    let health = compute_budget_health(noon(2024, 3, 15), &limits, &expenses);
    let json = serde_json::to_value(&health).unwrap();
    assert_eq!(json["categories"][0]["percentage"], serde_json::json!(33.3));
    assert_eq!(json["summary"]["overall_health"], serde_json::json!(66.7));
    assert_eq!(json["categories"][0]["status"], "good");
}

// ── Month projection ──────────────────────────────────────────

#[test]
fn test_budget_analysis_projection() {
    let expenses = vec![
        expense(Meals, dec!(100), noon(2024, 3, 4)),
        expense(Meals, dec!(300), noon(2024, 1, 20)),
        expense(Travel, dec!(60), noon(2024, 2, 3)),
        expense(Travel, dec!(40), noon(2024, 2, 25)),
        // before the 90-day lookback
        expense(Travel, dec!(5000), noon(2023, 11, 15)),
    ];
    let analysis = compute_budget_analysis(noon(2024, 3, 10), &expenses);
    assert_eq!(analysis.current_month_spending, dec!(100));
    assert_eq!(analysis.current_day, 10);
    assert_eq!(analysis.days_in_month, 31);
    assert_eq!(analysis.daily_average, dec!(10));
    assert_eq!(analysis.projected_month_end, dec!(310));
    assert_eq!(analysis.three_month_average, dec!(200));
    assert_eq!(analysis.spending_trend, SpendingTrend::AboveAverage);
}

#[test]
fn test_budget_analysis_without_history() {
    let analysis = compute_budget_analysis(noon(2024, 3, 10), &[]);
    assert_eq!(analysis.three_month_average, Decimal::ZERO);
    assert_eq!(analysis.projected_month_end, Decimal::ZERO);
    assert_eq!(analysis.spending_trend, SpendingTrend::BelowAverage);
}
