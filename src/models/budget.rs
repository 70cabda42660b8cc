use rust_decimal::Decimal;
use serde::Serialize;

use super::ExpenseCategory;
use crate::error::ExpenseError;

pub(crate) const MAX_LIMIT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Monthly spending limit for one category. At most one per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BudgetLimit {
    pub(crate) id: Option<i64>,
    pub(crate) category: ExpenseCategory,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) monthly_limit: Decimal,
}

impl BudgetLimit {
    /// Limits are whole cents between zero and `MAX_LIMIT`.
    pub(crate) fn new(
        category: ExpenseCategory,
        monthly_limit: Decimal,
    ) -> Result<Self, ExpenseError> {
        if monthly_limit < Decimal::ZERO {
            return Err(ExpenseError::NegativeLimit);
        }
        if monthly_limit > MAX_LIMIT {
            return Err(ExpenseError::validation(
                "limit",
                format!("cannot exceed {MAX_LIMIT}"),
            ));
        }
        if monthly_limit.normalize().scale() > 2 {
            return Err(ExpenseError::validation(
                "limit",
                "must have at most 2 decimal places",
            ));
        }
        Ok(Self {
            id: None,
            category,
            monthly_limit,
        })
    }
}
