#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::budget::MAX_LIMIT;
use super::expense::{MAX_AMOUNT, MAX_VENDOR_LEN, MIN_AMOUNT};
use super::*;
use crate::error::ExpenseError;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn invalid_field(err: ExpenseError) -> &'static str {
    match err {
        ExpenseError::Validation { field, .. } => field,
        _ => "",
    }
}

fn draft(amount: Decimal) -> ExpenseDraft {
    ExpenseDraft {
        amount,
        vendor: "Pizza Palace".into(),
        description: "Team lunch".into(),
        ..Default::default()
    }
}

// ── ExpenseCategory ───────────────────────────────────────────

#[test]
fn test_category_parse() {
    assert_eq!(
        "meals".parse::<ExpenseCategory>().unwrap(),
        ExpenseCategory::Meals
    );
    assert_eq!(
        "TRAVEL".parse::<ExpenseCategory>().unwrap(),
        ExpenseCategory::Travel
    );
    assert_eq!(
        " Software ".parse::<ExpenseCategory>().unwrap(),
        ExpenseCategory::Software
    );
}

#[test]
fn test_category_parse_rejects_unknown() {
    let err = "groceries".parse::<ExpenseCategory>().unwrap_err();
    assert_eq!(err, ExpenseError::UnknownCategory("groceries".into()));
    assert!(err.to_string().contains("groceries"));
}

#[test]
fn test_category_parse_rejects_empty() {
    assert!("".parse::<ExpenseCategory>().is_err());
}

#[test]
fn test_category_roundtrip() {
    for c in ExpenseCategory::all() {
        let back: ExpenseCategory = c.as_str().parse().unwrap();
        assert_eq!(*c, back, "Roundtrip failed for {c}");
    }
}

#[test]
fn test_category_order_matches_all() {
    let mut sorted = ExpenseCategory::all().to_vec();
    sorted.sort();
    assert_eq!(sorted, ExpenseCategory::all());
}

#[test]
fn test_discretionary_set() {
    let d = ExpenseCategory::discretionary();
    assert_eq!(d.len(), 3);
    assert!(d.contains(&ExpenseCategory::Meals));
    assert!(d.contains(&ExpenseCategory::Other));
    assert!(d.contains(&ExpenseCategory::Marketing));
    assert!(!d.contains(&ExpenseCategory::Travel));
}

#[test]
fn test_category_title() {
    assert_eq!(ExpenseCategory::Utilities.title(), "Utilities");
    assert_eq!(format!("{}", ExpenseCategory::Utilities), "utilities");
}

#[test]
fn test_category_serializes_lowercase() {
    let json = serde_json::to_string(&ExpenseCategory::Marketing).unwrap();
    assert_eq!(json, "\"marketing\"");
}

// ── ExpenseStatus ─────────────────────────────────────────────

#[test]
fn test_status_parse() {
    assert_eq!(
        "pending".parse::<ExpenseStatus>().unwrap(),
        ExpenseStatus::Pending
    );
    assert_eq!(
        "Approved".parse::<ExpenseStatus>().unwrap(),
        ExpenseStatus::Approved
    );
    assert_eq!(
        "rejected".parse::<ExpenseStatus>().unwrap(),
        ExpenseStatus::Rejected
    );
}

#[test]
fn test_status_parse_rejects_unknown() {
    assert_eq!(
        "reimbursed".parse::<ExpenseStatus>().unwrap_err(),
        ExpenseError::UnknownStatus("reimbursed".into())
    );
}

#[test]
fn test_status_default_is_pending() {
    assert_eq!(ExpenseStatus::default(), ExpenseStatus::Pending);
}

// ── ExpenseDraft ──────────────────────────────────────────────

#[test]
fn test_draft_validate_defaults() {
    let now = at(2024, 3, 10);
    let expense = draft(dec!(45.67)).validate(now).unwrap();
    assert!(expense.id.is_none());
    assert_eq!(expense.amount, dec!(45.67));
    assert_eq!(expense.category, ExpenseCategory::Other);
    assert_eq!(expense.status, ExpenseStatus::Pending);
    assert_eq!(expense.created_at, now);
}

#[test]
fn test_draft_validate_keeps_given_fields() {
    let when = at(2024, 1, 2);
    let mut d = draft(dec!(120));
    d.category = Some(ExpenseCategory::Software);
    d.status = Some(ExpenseStatus::Approved);
    d.created_at = Some(when);
    let expense = d.validate(at(2024, 3, 10)).unwrap();
    assert_eq!(expense.category, ExpenseCategory::Software);
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert_eq!(expense.created_at, when);
}

#[test]
fn test_draft_amount_bounds() {
    let now = at(2024, 3, 10);
    assert!(draft(MIN_AMOUNT).validate(now).is_ok());
    assert!(draft(MAX_AMOUNT).validate(now).is_ok());

    let err = draft(Decimal::ZERO).validate(now).unwrap_err();
    assert_eq!(invalid_field(err), "amount");

    let err = draft(dec!(1000000.01)).validate(now).unwrap_err();
    assert_eq!(invalid_field(err), "amount");

    assert!(draft(dec!(-5)).validate(now).is_err());
}

#[test]
fn test_draft_text_limits() {
    let now = at(2024, 3, 10);
    let mut d = draft(dec!(10));
    d.vendor = "v".repeat(MAX_VENDOR_LEN + 1);
    assert_eq!(invalid_field(d.validate(now).unwrap_err()), "vendor");

    let mut d = draft(dec!(10));
    d.description = "d".repeat(MAX_DESCRIPTION_LEN + 1);
    assert_eq!(invalid_field(d.validate(now).unwrap_err()), "description");
}

#[test]
fn test_draft_trims_text() {
    let mut d = draft(dec!(10));
    d.vendor = "  Staples  ".into();
    let expense = d.validate(at(2024, 3, 10)).unwrap();
    assert_eq!(expense.vendor, "Staples");
}

// ── BudgetLimit ───────────────────────────────────────────────

#[test]
fn test_budget_limit_new() {
    let limit = BudgetLimit::new(ExpenseCategory::Meals, dec!(400)).unwrap();
    assert!(limit.id.is_none());
    assert_eq!(limit.category, ExpenseCategory::Meals);
    assert_eq!(limit.monthly_limit, dec!(400));
}

#[test]
fn test_budget_limit_zero_allowed() {
    assert!(BudgetLimit::new(ExpenseCategory::Other, Decimal::ZERO).is_ok());
}

#[test]
fn test_budget_limit_negative_rejected() {
    assert_eq!(
        BudgetLimit::new(ExpenseCategory::Other, dec!(-1)).unwrap_err(),
        ExpenseError::NegativeLimit
    );
}

#[test]
fn test_budget_limit_bounds() {
    assert!(BudgetLimit::new(ExpenseCategory::Meals, MAX_LIMIT).is_ok());
    let over = MAX_LIMIT + dec!(0.01);
    let err = BudgetLimit::new(ExpenseCategory::Meals, over).unwrap_err();
    assert_eq!(invalid_field(err), "limit");
    assert!(BudgetLimit::new(ExpenseCategory::Meals, Decimal::MAX).is_err());
}

#[test]
fn test_budget_limit_whole_cents_only() {
    assert!(BudgetLimit::new(ExpenseCategory::Meals, dec!(12.34)).is_ok());
    assert!(BudgetLimit::new(ExpenseCategory::Meals, dec!(12.500)).is_ok());
    let tiny = dec!(0.0000000000000000000000000001);
    let err = BudgetLimit::new(ExpenseCategory::Meals, tiny).unwrap_err();
    assert_eq!(invalid_field(err), "limit");
    assert!(BudgetLimit::new(ExpenseCategory::Meals, dec!(0.001)).is_err());
}

// ── VendorRule ────────────────────────────────────────────────

#[test]
fn test_vendor_rule_new_contains() {
    let rule = VendorRule::new_contains("adobe".into(), ExpenseCategory::Software);
    assert!(rule.id.is_none());
    assert_eq!(rule.pattern, "adobe");
    assert!(!rule.is_regex);
    assert_eq!(rule.priority, 0);
}

#[test]
fn test_vendor_rule_new_regex_with_priority() {
    let rule = VendorRule::new_regex(r"^UNITED.*".into(), ExpenseCategory::Travel).with_priority(5);
    assert!(rule.is_regex);
    assert_eq!(rule.category, ExpenseCategory::Travel);
    assert_eq!(rule.priority, 5);
}
