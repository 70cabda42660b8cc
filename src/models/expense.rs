use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::error::ExpenseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ExpenseCategory {
    Meals,
    Travel,
    Office,
    Software,
    Marketing,
    Utilities,
    Other,
}

impl ExpenseCategory {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Meals => "meals",
            Self::Travel => "travel",
            Self::Office => "office",
            Self::Software => "software",
            Self::Marketing => "marketing",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }

    /// Canonical iteration order; reports that list categories follow it.
    pub(crate) fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Meals,
            Self::Travel,
            Self::Office,
            Self::Software,
            Self::Marketing,
            Self::Utilities,
            Self::Other,
        ]
    }

    /// Flexible categories whose leftover budget counts as safe to spend.
    pub(crate) fn discretionary() -> &'static [ExpenseCategory] {
        &[Self::Meals, Self::Other, Self::Marketing]
    }

    /// "Meals" style label for display.
    pub(crate) fn title(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ExpenseError::UnknownCategory(s.trim().to_string()))
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub(crate) fn all() -> &'static [ExpenseStatus] {
        &[Self::Pending, Self::Approved, Self::Rejected]
    }
}

impl FromStr for ExpenseStatus {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == lower)
            .ok_or_else(|| ExpenseError::UnknownStatus(s.trim().to_string()))
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Expense {
    pub(crate) id: Option<i64>,
    #[serde(serialize_with = "crate::money::serialize")]
    pub(crate) amount: Decimal,
    pub(crate) category: ExpenseCategory,
    pub(crate) status: ExpenseStatus,
    pub(crate) vendor: String,
    pub(crate) description: String,
    pub(crate) created_at: NaiveDateTime,
}

pub(crate) const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
pub(crate) const MAX_VENDOR_LEN: usize = 100;
pub(crate) const MAX_DESCRIPTION_LEN: usize = 500;

/// Unvalidated expense input from the CLI, TUI or a CSV row.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseDraft {
    pub(crate) amount: Decimal,
    pub(crate) category: Option<ExpenseCategory>,
    pub(crate) status: Option<ExpenseStatus>,
    pub(crate) vendor: String,
    pub(crate) description: String,
    pub(crate) created_at: Option<NaiveDateTime>,
}

impl ExpenseDraft {
    /// Check the write-path rules and build an `Expense`.
    /// `now` fills in a missing timestamp; a missing category becomes `Other`.
    pub(crate) fn validate(self, now: NaiveDateTime) -> Result<Expense, ExpenseError> {
        if self.amount < MIN_AMOUNT {
            return Err(ExpenseError::validation(
                "amount",
                format!("must be at least {MIN_AMOUNT}"),
            ));
        }
        if self.amount > MAX_AMOUNT {
            return Err(ExpenseError::validation(
                "amount",
                format!("cannot exceed {MAX_AMOUNT}"),
            ));
        }

        let vendor = self.vendor.trim().to_string();
        if vendor.chars().count() > MAX_VENDOR_LEN {
            return Err(ExpenseError::validation(
                "vendor",
                format!("must be at most {MAX_VENDOR_LEN} characters"),
            ));
        }

        let description = self.description.trim().to_string();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ExpenseError::validation(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }

        Ok(Expense {
            id: None,
            amount: self.amount,
            category: self.category.unwrap_or(ExpenseCategory::Other),
            status: self.status.unwrap_or_default(),
            vendor,
            description,
            created_at: self.created_at.unwrap_or(now),
        })
    }
}
