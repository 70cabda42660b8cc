mod budget;
mod expense;
mod vendor_rule;

pub(crate) use budget::BudgetLimit;
pub(crate) use expense::{
    Expense, ExpenseCategory, ExpenseDraft, ExpenseStatus, MAX_DESCRIPTION_LEN,
};
pub(crate) use vendor_rule::VendorRule;

#[cfg(test)]
mod tests;
