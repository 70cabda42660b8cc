#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::models::{BudgetLimit, Expense, ExpenseCategory, ExpenseStatus};

pub(crate) fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub(crate) fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    dt(y, m, d, 12, 0, 0)
}

pub(crate) fn expense(
    category: ExpenseCategory,
    amount: Decimal,
    created_at: NaiveDateTime,
) -> Expense {
    Expense {
        id: None,
        amount,
        category,
        status: ExpenseStatus::Approved,
        vendor: "Vendor".into(),
        description: String::new(),
        created_at,
    }
}

pub(crate) fn pending(
    category: ExpenseCategory,
    amount: Decimal,
    created_at: NaiveDateTime,
) -> Expense {
    Expense {
        status: ExpenseStatus::Pending,
        ..expense(category, amount, created_at)
    }
}

pub(crate) fn limit(category: ExpenseCategory, amount: Decimal) -> BudgetLimit {
    BudgetLimit::new(category, amount).unwrap()
}
