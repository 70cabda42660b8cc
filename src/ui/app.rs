use anyhow::Result;
use chrono::NaiveDateTime;

use crate::db::{Database, ExpenseFilter};
use crate::engine::{
    self, Alert, BudgetHealth, CategoryHealth, MonthWindow, Overview, SafeToSpend, Trends,
};
use crate::models::{Expense, ExpenseCategory};

/// Rows loaded into the Expenses screen at most.
const EXPENSE_PAGE_LIMIT: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Budgets,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Expenses, Self::Budgets]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Budgets => write!(f, "Budgets"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, label: String },
    DeleteBudget { category: ExpenseCategory },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) currency_symbol: String,
    /// Instant the reports were last computed for.
    pub(crate) now: NaiveDateTime,

    // Dashboard
    pub(crate) safe_to_spend: Option<SafeToSpend>,
    pub(crate) overview: Option<Overview>,
    pub(crate) trends: Option<Trends>,
    pub(crate) alerts: Vec<Alert>,
    pub(crate) expense_count: i64,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,
    pub(crate) month_filter: Option<MonthWindow>,

    // Budgets
    pub(crate) health: Option<BudgetHealth>,
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(currency_symbol: &str, now: NaiveDateTime) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            currency_symbol: currency_symbol.to_string(),
            now,

            safe_to_spend: None,
            overview: None,
            trends: None,
            alerts: Vec::new(),
            expense_count: 0,

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,
            month_filter: None,

            health: None,
            budget_index: 0,
            budget_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Recompute every report from a fresh snapshot. Each report is
    /// computed on its own, so one failing load does not blank the others.
    pub(crate) fn refresh_dashboard(&mut self, db: &Database) -> Result<()> {
        let expenses = db.all_expenses()?;
        let limits = db.get_budgets()?;

        self.safe_to_spend = Some(engine::compute_safe_to_spend(self.now, &limits, &expenses));
        self.overview = Some(engine::compute_overview(self.now, &expenses));
        self.trends = Some(engine::compute_trends(self.now, &expenses));
        self.alerts = engine::compute_alerts(self.now, &expenses);
        self.expense_count = db.expense_count()?;
        Ok(())
    }

    pub(crate) fn refresh_expenses(&mut self, db: &Database) -> Result<()> {
        let search = Some(self.search_input.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.expenses = db.list_expenses(&ExpenseFilter {
            month: self.month_filter,
            search,
            limit: Some(EXPENSE_PAGE_LIMIT),
            ..Default::default()
        })?;
        clamp_cursor(
            &mut self.expense_index,
            &mut self.expense_scroll,
            self.expenses.len(),
        );
        Ok(())
    }

    pub(crate) fn refresh_budgets(&mut self, db: &Database) -> Result<()> {
        let expenses = db.all_expenses()?;
        let limits = db.get_budgets()?;
        let health = engine::compute_budget_health(self.now, &limits, &expenses);
        clamp_cursor(
            &mut self.budget_index,
            &mut self.budget_scroll,
            health.categories.len(),
        );
        self.health = Some(health);
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_dashboard(db)?;
        self.refresh_expenses(db)?;
        self.refresh_budgets(db)?;
        Ok(())
    }

    /// Move the report clock forward and reload everything.
    pub(crate) fn reload(&mut self, db: &Database, now: NaiveDateTime) -> Result<()> {
        self.now = now;
        self.refresh_all(db)
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    pub(crate) fn budget_rows(&self) -> &[CategoryHealth] {
        match &self.health {
            Some(h) => &h.categories,
            None => &[],
        }
    }

    pub(crate) fn selected_budget(&self) -> Option<&CategoryHealth> {
        self.budget_rows().get(self.budget_index)
    }

    /// Rows that fit in the table body below its border and header.
    pub(crate) fn page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
