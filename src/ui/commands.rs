use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::categorize::{compile_pattern, suggest_rule, Categorizer};
use crate::db::Database;
use crate::engine::MonthWindow;
use crate::import::parse_decimal;
use crate::models::{BudgetLimit, ExpenseCategory, ExpenseDraft, ExpenseStatus, VendorRule};
use crate::money::format_money;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit ExpenseSink", cmd_quit, r);
    register_command!("quit", "Quit ExpenseSink", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "refresh",
        "Recompute reports for the current time",
        cmd_refresh,
        r
    );
    register_command!(
        "add",
        "Add expense (e.g. :add 12.50 Blue Bottle Coffee)",
        cmd_add,
        r
    );
    register_command!("a", "Add expense (e.g. :a 12.50 Lunch)", cmd_add, r);
    register_command!("approve", "Approve selected expense", cmd_approve, r);
    register_command!("reject", "Reject selected expense", cmd_reject, r);
    register_command!("recat", "Re-categorize selected expense", cmd_recat, r);
    register_command!(
        "describe",
        "Edit description of selected expense",
        cmd_describe,
        r
    );
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "budget",
        "Set budget (e.g. :budget meals 500)",
        cmd_budget,
        r
    );
    register_command!(
        "budget-delete",
        "Delete a budget (selected one if no category given)",
        cmd_budget_delete,
        r
    );
    register_command!(
        "rule",
        "Add vendor rule (e.g. :rule uber travel)",
        cmd_rule,
        r
    );
    register_command!(
        "regex-rule",
        "Add regex rule (e.g. :regex-rule ^aws software)",
        cmd_regex_rule,
        r
    );
    register_command!(
        "learn",
        "Add a rule from the selected expense's vendor",
        cmd_learn,
        r
    );
    register_command!(
        "search",
        "Search expenses (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search expenses (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "month",
        "Show one month of expenses (e.g. :month 2024-01)",
        cmd_month,
        r
    );
    register_command!("m", "Show one month (e.g. :m 2024-01)", cmd_month, r);
    register_command!(
        "export",
        "Export expenses to CSV (e.g. :export ~/expenses.csv)",
        cmd_export,
        r
    );
    register_command!(
        "import",
        "Import expenses from CSV (e.g. :import ~/expenses.csv)",
        cmd_import,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Shared actions ───────────────────────────────────────────

/// Reload whatever the write could have changed.
pub(crate) fn refresh_after_write(app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.refresh_dashboard(db)?;
    app.refresh_expenses(db)?;
    app.refresh_budgets(db)
}

fn selected_expense_id(app: &mut App) -> Option<i64> {
    let id = if app.screen == Screen::Expenses {
        app.selected_expense().and_then(|e| e.id)
    } else {
        None
    };
    if id.is_none() {
        app.set_status("Navigate to Expenses and select one first");
    }
    id
}

pub(crate) fn set_selected_status(
    app: &mut App,
    db: &mut Database,
    status: ExpenseStatus,
) -> anyhow::Result<()> {
    let Some(id) = selected_expense_id(app) else {
        return Ok(());
    };
    if db.update_expense_status(id, status)? {
        refresh_after_write(app, db)?;
        app.set_status(format!("Expense {id} marked {status}"));
    } else {
        app.set_status(format!("Expense {id} no longer exists"));
        app.refresh_expenses(db)?;
    }
    Ok(())
}

pub(crate) fn request_delete_expense(app: &mut App) {
    let Some(id) = selected_expense_id(app) else {
        return;
    };
    let label = app
        .selected_expense()
        .map(|e| {
            let who = if e.vendor.is_empty() {
                &e.description
            } else {
                &e.vendor
            };
            format!("{} {}", format_money(e.amount, &app.currency_symbol), who)
        })
        .unwrap_or_default();
    app.confirm_message = format!("Delete expense '{}'?", label.trim());
    app.pending_action = Some(PendingAction::DeleteExpense { id, label });
    app.input_mode = InputMode::Confirm;
}

pub(crate) fn request_delete_budget(app: &mut App, category: Option<ExpenseCategory>) {
    let category = category.or_else(|| {
        if app.screen == Screen::Budgets {
            app.selected_budget().map(|b| b.category)
        } else {
            None
        }
    });
    let Some(category) = category else {
        app.set_status("Usage: :budget-delete <category>, or select one on Budgets");
        return;
    };
    app.confirm_message = format!("Delete budget for {category}?");
    app.pending_action = Some(PendingAction::DeleteBudget { category });
    app.input_mode = InputMode::Confirm;
}

/// Carry out a confirmed action.
pub(crate) fn apply_pending(
    action: PendingAction,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    match action {
        PendingAction::DeleteExpense { id, label } => {
            if db.delete_expense(id)? {
                app.set_status(format!("Deleted: {}", label.trim()));
            } else {
                app.set_status(format!("Expense {id} no longer exists"));
            }
        }
        PendingAction::DeleteBudget { category } => {
            if db.delete_budget(category)? {
                app.set_status(format!("Deleted budget: {category}"));
            } else {
                app.set_status(format!("No budget set for {category}"));
            }
        }
    }
    refresh_after_write(app, db)
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)?;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)?;
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_budgets(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.reload(db, crate::run::now_utc())?;
    app.set_status("Reports refreshed");
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let mut parts = args.splitn(2, ' ');
    let amount_str = parts.next().unwrap_or("");
    let vendor = parts.next().unwrap_or("").trim().to_string();
    if amount_str.is_empty() {
        app.set_status("Usage: :add <amount> <vendor>. Example: :add 12.50 Blue Bottle Coffee");
        return Ok(());
    }

    let amount = match parse_decimal(amount_str) {
        Ok(a) => a,
        Err(e) => {
            app.set_status(e);
            return Ok(());
        }
    };

    let category = Categorizer::new(&db.get_vendor_rules()?).suggest(&vendor, "");
    let draft = ExpenseDraft {
        amount,
        category: Some(category),
        vendor,
        ..Default::default()
    };
    let expense = match draft.validate(crate::run::now_utc()) {
        Ok(e) => e,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };

    db.insert_expense(&expense)?;
    refresh_after_write(app, db)?;
    app.set_status(format!(
        "Added {} {} as {}",
        format_money(expense.amount, &app.currency_symbol),
        expense.vendor,
        expense.category
    ));
    Ok(())
}

fn cmd_approve(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_selected_status(app, db, ExpenseStatus::Approved)
}

fn cmd_reject(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_selected_status(app, db, ExpenseStatus::Rejected)
}

fn cmd_recat(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!(
            "Usage: :recat <category>. Categories: {}",
            category_names()
        ));
        return Ok(());
    }
    let category = match ExpenseCategory::from_str(args) {
        Ok(c) => c,
        Err(e) => {
            app.set_status(format!("{e}. Categories: {}", category_names()));
            return Ok(());
        }
    };
    let Some(id) = selected_expense_id(app) else {
        return Ok(());
    };

    db.update_expense_category(id, category)?;
    refresh_after_write(app, db)?;
    app.set_status(format!("Categorized as: {category}"));
    Ok(())
}

fn cmd_describe(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(id) = selected_expense_id(app) else {
        return Ok(());
    };

    if args.is_empty() {
        // Enter editing mode with the current text
        if let Some(e) = app.selected_expense() {
            app.command_input = e.description.clone();
            app.input_mode = InputMode::Editing;
            app.set_status("Type the new description, press Enter to confirm");
        }
        return Ok(());
    }

    update_description(app, db, id, args)
}

/// Re-validate the expense with a new description and save it.
pub(crate) fn update_description(
    app: &mut App,
    db: &mut Database,
    id: i64,
    description: &str,
) -> anyhow::Result<()> {
    let Some(current) = db.get_expense(id)? else {
        app.set_status(format!("Expense {id} no longer exists"));
        return Ok(());
    };
    let draft = ExpenseDraft {
        amount: current.amount,
        category: Some(current.category),
        status: Some(current.status),
        vendor: current.vendor,
        description: description.to_string(),
        created_at: Some(current.created_at),
    };
    match draft.validate(current.created_at) {
        Ok(mut updated) => {
            updated.id = Some(id);
            db.update_expense(&updated)?;
            refresh_after_write(app, db)?;
            app.set_status(format!("Updated description of expense {id}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    request_delete_expense(app);
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [category, limit] = parts.as_slice() else {
        app.set_status(format!(
            "Usage: :budget <category> <limit>. Categories: {}",
            category_names()
        ));
        return Ok(());
    };

    let budget = ExpenseCategory::from_str(category)
        .map_err(|e| e.to_string())
        .and_then(|c| {
            let limit = parse_decimal(limit)?;
            BudgetLimit::new(c, limit).map_err(|e| e.to_string())
        });
    match budget {
        Ok(budget) => {
            db.upsert_budget(&budget)?;
            refresh_after_write(app, db)?;
            app.set_status(format!(
                "Budget for {} set to {}",
                budget.category,
                format_money(budget.monthly_limit, &app.currency_symbol)
            ));
        }
        Err(msg) => app.set_status(msg),
    }
    Ok(())
}

fn cmd_budget_delete(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        request_delete_budget(app, None);
        return Ok(());
    }
    match ExpenseCategory::from_str(args) {
        Ok(c) => request_delete_budget(app, Some(c)),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_rule(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_rule(args, false, app, db)
}

fn cmd_regex_rule(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_rule(args, true, app, db)
}

/// `<pattern> <category>`; the category is the last word so patterns may contain spaces.
fn add_rule(args: &str, is_regex: bool, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((pattern, category)) = args.rsplit_once(' ') else {
        app.set_status("Usage: :rule <pattern> <category>");
        return Ok(());
    };
    let pattern = pattern.trim();
    let category = match ExpenseCategory::from_str(category) {
        Ok(c) => c,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };

    let rule = if is_regex {
        if let Err(e) = compile_pattern(pattern) {
            app.set_status(format!("Invalid regex: {e}"));
            return Ok(());
        }
        VendorRule::new_regex(pattern.to_string(), category)
    } else {
        VendorRule::new_contains(pattern.to_string(), category)
    };
    db.insert_vendor_rule(&rule)?;
    app.set_status(format!("Added rule: '{pattern}' -> {category}"));
    Ok(())
}

fn cmd_learn(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(id) = selected_expense_id(app) else {
        return Ok(());
    };
    let Some((pattern, category)) = app
        .selected_expense()
        .map(|e| (suggest_rule(&e.vendor), e.category))
    else {
        return Ok(());
    };
    if pattern.is_empty() {
        app.set_status(format!("Expense {id} has no vendor to learn from"));
        return Ok(());
    }

    db.insert_vendor_rule(&VendorRule::new_contains(pattern.clone(), category))?;
    app.set_status(format!("Learned rule: '{pattern}' -> {category}"));
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(db)?;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("{} matches for '{args}'", app.expenses.len()));
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.month_filter = None;
        app.set_status("Showing all months");
    } else {
        match MonthWindow::parse(args) {
            Ok(m) => {
                app.month_filter = Some(m);
                app.set_status(format!("Showing {}", m.label()));
            }
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        }
    }
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(db)?;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let suffix = app
            .month_filter
            .map(|m| m.label())
            .unwrap_or_else(|| "all".into());
        crate::run::shellexpand(&format!("~/expensesink-export-{suffix}.csv"))
    } else {
        crate::run::shellexpand(args)
    };

    let count = crate::import::export_file(db, Path::new(&path), app.month_filter)?;
    if count == 0 {
        app.set_status("No expenses to export");
    } else {
        app.set_status(format!("Exported {count} expenses to {path}"));
    }
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }
    let path = crate::run::shellexpand(args);
    if !Path::new(&path).exists() {
        app.set_status(format!("File not found: {path}"));
        return Ok(());
    }

    let report = crate::import::import_file(db, Path::new(&path), crate::run::now_utc())?;
    refresh_after_write(app, db)?;
    let skipped = match report.errors.first() {
        Some(first) => format!(" ({} skipped, first: {first})", report.errors.len()),
        None => String::new(),
    };
    app.set_status(format!(
        "Imported {} expenses{skipped}",
        report.expenses.len()
    ));
    Ok(())
}

fn category_names() -> String {
    ExpenseCategory::all()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
