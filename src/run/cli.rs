use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::categorize::{compile_pattern, Categorizer};
use crate::config::{AppDirs, Config};
use crate::db::{Database, ExpenseFilter};
use crate::engine::{self, Alert, MonthWindow};
use crate::import::{parse_datetime, parse_decimal};
use crate::models::{BudgetLimit, Expense, ExpenseCategory, ExpenseDraft, ExpenseStatus, VendorRule};
use crate::money::{format_money, saturating_sum};

use super::{now_utc, shellexpand};

/// Flags that stand alone; every other `--flag` takes a value.
const SWITCHES: [&str; 2] = ["--json", "--regex"];

pub(crate) fn as_cli(
    args: &[String],
    db: &mut Database,
    config: &Config,
    dirs: &AppDirs,
) -> Result<()> {
    let rest = &args[2..];
    let symbol = config.currency_symbol.as_str();
    match args[1].as_str() {
        "add" => cli_add(rest, db, now_utc()),
        "list" | "ls" => cli_list(rest, db, symbol),
        "update" => cli_update(rest, db, now_utc()),
        "status" => cli_status(rest, db),
        "delete" | "rm" => cli_delete(rest, db),
        "budget" => cli_budget(rest, db, symbol),
        "budget-delete" => cli_budget_delete(rest, db),
        "budgets" => cli_budgets(rest, db, symbol),
        "rule" => cli_rule(rest, db),
        "rules" => cli_rules(db),
        "rule-delete" => cli_rule_delete(rest, db),
        "safe-to-spend" | "sts" | "health" | "analysis" | "overview" | "trends" | "alerts"
        | "weekly" => cli_report(&args[1], rest, db),
        "export" => cli_export(rest, db),
        "import" => cli_import(rest, db),
        "config" => cli_config(rest, db, config, dirs),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("expensesink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("ExpenseSink - local expense tracker with safe-to-spend budgeting");
    println!();
    println!("Usage: expensesink [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  add <amount>                    Record an expense");
    println!("    --vendor <name>  --description <text>");
    println!("    --category <c>   --status <s>  --date <YYYY-MM-DD[THH:MM:SS]>");
    println!("  list                            List expenses, newest first");
    println!("    --month <YYYY-MM> --category <c> --status <s> --search <text>");
    println!("    --limit <n> --json");
    println!("  update <id> [add flags]         Change fields of an expense");
    println!("  status <id> <status>            Set pending, approved or rejected");
    println!("  delete <id>                     Delete an expense");
    println!("  budget <category> <limit>       Set a monthly budget limit");
    println!("  budget-delete <category>        Remove a budget limit");
    println!("  budgets [--json]                List budget limits");
    println!("  rule <pattern> <category>       Add a vendor rule");
    println!("    --regex --priority <n>");
    println!("  rules                           List vendor rules");
    println!("  rule-delete <id>                Remove a vendor rule");
    println!("  safe-to-spend                   Safe-to-spend for the current month");
    println!("  health                          Budget health per category");
    println!("  analysis                        Month-end projection");
    println!("  overview | trends | alerts      Dashboard reports");
    println!("  weekly                          This week against last week");
    println!("    (reports accept --as-of <date> to evaluate at a fixed time)");
    println!("  export [path] [--month <m>]     Export expenses to CSV");
    println!("  import <file.csv>               Import expenses from CSV");
    println!("  config [init]                   Show paths and settings, or write defaults");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

// ── Argument helpers ──────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn has_switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_id(arg: Option<&&str>, usage: &str) -> Result<i64> {
    let Some(raw) = arg else {
        anyhow::bail!("Usage: {usage}");
    };
    raw.parse().with_context(|| format!("Invalid id '{raw}'"))
}

fn parse_amount(raw: &str) -> Result<rust_decimal::Decimal> {
    parse_decimal(raw).map_err(anyhow::Error::msg)
}

fn parse_when(raw: &str) -> Result<NaiveDateTime> {
    parse_datetime(raw).map_err(anyhow::Error::msg)
}

fn as_of(args: &[String]) -> Result<NaiveDateTime> {
    flag(args, "--as-of").map_or_else(|| Ok(now_utc()), parse_when)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Expenses ──────────────────────────────────────────────────

fn cli_add(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let pos = positionals(args);
    let Some(raw_amount) = pos.first() else {
        anyhow::bail!("Usage: expensesink add <amount> [--vendor <name>] [--category <c>] ...");
    };

    let vendor = flag(args, "--vendor").unwrap_or_default().to_string();
    let description = flag(args, "--description").unwrap_or_default().to_string();
    let category = match flag(args, "--category") {
        Some(c) => ExpenseCategory::from_str(c)?,
        None => Categorizer::new(&db.get_vendor_rules()?).suggest(&vendor, &description),
    };

    let draft = ExpenseDraft {
        amount: parse_amount(raw_amount)?,
        category: Some(category),
        status: flag(args, "--status")
            .map(ExpenseStatus::from_str)
            .transpose()?,
        vendor,
        description,
        created_at: flag(args, "--date").map(parse_when).transpose()?,
    };
    let mut expense = draft.validate(now)?;
    expense.id = Some(db.insert_expense(&expense)?);
    print_json(&expense)
}

fn cli_list(args: &[String], db: &mut Database, symbol: &str) -> Result<()> {
    let filter = ExpenseFilter {
        month: flag(args, "--month").map(MonthWindow::parse).transpose()?,
        category: flag(args, "--category")
            .map(ExpenseCategory::from_str)
            .transpose()?,
        status: flag(args, "--status")
            .map(ExpenseStatus::from_str)
            .transpose()?,
        search: flag(args, "--search").map(str::to_string),
        limit: flag(args, "--limit")
            .map(|n| n.parse().with_context(|| format!("Invalid limit '{n}'")))
            .transpose()?,
    };
    let expenses = db.list_expenses(&filter)?;

    if has_switch(args, "--json") {
        return print_json(&expenses);
    }
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<5} {:<19} {:>12} {:<14} {:<9} {:<24} Description",
        "ID", "Date", "Amount", "Category", "Status", "Vendor"
    );
    println!("{}", "─".repeat(100));
    for e in &expenses {
        println!(
            "{:<5} {:<19} {:>12} {:<14} {:<9} {:<24} {}",
            e.id.unwrap_or(0),
            e.created_at.format("%Y-%m-%d %H:%M:%S"),
            format_money(e.amount, symbol),
            e.category,
            e.status,
            crate::ui::util::truncate(&e.vendor, 24),
            e.description,
        );
    }
    let total: rust_decimal::Decimal = expenses.iter().map(|e| e.amount).sum();
    println!("{}", "─".repeat(100));
    println!(
        "{} expenses, {}",
        expenses.len(),
        format_money(total, symbol)
    );
    Ok(())
}

fn cli_update(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let pos = positionals(args);
    let id = parse_id(
        pos.first(),
        "expensesink update <id> [--amount <n>] [--vendor <name>] ...",
    )?;
    let current = find_expense(db, id)?;

    let draft = ExpenseDraft {
        amount: flag(args, "--amount").map_or(Ok(current.amount), parse_amount)?,
        category: Some(
            flag(args, "--category")
                .map(ExpenseCategory::from_str)
                .transpose()?
                .unwrap_or(current.category),
        ),
        status: Some(
            flag(args, "--status")
                .map(ExpenseStatus::from_str)
                .transpose()?
                .unwrap_or(current.status),
        ),
        vendor: flag(args, "--vendor").map_or(current.vendor, str::to_string),
        description: flag(args, "--description").map_or(current.description, str::to_string),
        created_at: Some(flag(args, "--date").map_or(Ok(current.created_at), parse_when)?),
    };
    let mut expense = draft.validate(now)?;
    expense.id = Some(id);
    db.update_expense(&expense)?;
    print_json(&expense)
}

fn cli_status(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let usage = "expensesink status <id> <pending|approved|rejected>";
    let id = parse_id(pos.first(), usage)?;
    let Some(raw) = pos.get(1) else {
        anyhow::bail!("Usage: {usage}");
    };
    let status = ExpenseStatus::from_str(raw)?;
    if !db.update_expense_status(id, status)? {
        anyhow::bail!("Expense {id} not found");
    }
    println!("Expense {id} marked {status}");
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let id = parse_id(pos.first(), "expensesink delete <id>")?;
    if !db.delete_expense(id)? {
        anyhow::bail!("Expense {id} not found");
    }
    println!("Deleted expense {id}");
    Ok(())
}

fn find_expense(db: &Database, id: i64) -> Result<Expense> {
    db.get_expense(id)?
        .ok_or_else(|| anyhow::anyhow!("Expense {id} not found"))
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget(args: &[String], db: &mut Database, symbol: &str) -> Result<()> {
    let pos = positionals(args);
    let (Some(category), Some(limit)) = (pos.first(), pos.get(1)) else {
        anyhow::bail!("Usage: expensesink budget <category> <monthly limit>");
    };
    let budget = BudgetLimit::new(ExpenseCategory::from_str(category)?, parse_amount(limit)?)?;
    db.upsert_budget(&budget)?;
    println!(
        "Budget for {} set to {} per month",
        budget.category,
        format_money(budget.monthly_limit, symbol)
    );
    Ok(())
}

fn cli_budget_delete(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let Some(raw) = pos.first() else {
        anyhow::bail!("Usage: expensesink budget-delete <category>");
    };
    let category = ExpenseCategory::from_str(raw)?;
    if !db.delete_budget(category)? {
        anyhow::bail!("No budget set for {category}");
    }
    println!("Removed budget for {category}");
    Ok(())
}

fn cli_budgets(args: &[String], db: &mut Database, symbol: &str) -> Result<()> {
    let budgets = db.get_budgets()?;
    if has_switch(args, "--json") {
        return print_json(&budgets);
    }
    if budgets.is_empty() {
        println!("No budgets");
        return Ok(());
    }

    println!("{:<16} {:>14}", "Category", "Monthly limit");
    println!("{}", "─".repeat(31));
    for b in &budgets {
        println!(
            "{:<16} {:>14}",
            b.category,
            format_money(b.monthly_limit, symbol)
        );
    }
    let total = saturating_sum(budgets.iter().map(|b| b.monthly_limit));
    println!("{}", "─".repeat(31));
    println!("{:<16} {:>14}", "Total", format_money(total, symbol));
    Ok(())
}

// ── Vendor rules ──────────────────────────────────────────────

fn cli_rule(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let (Some(pattern), Some(category)) = (pos.first(), pos.get(1)) else {
        anyhow::bail!("Usage: expensesink rule <pattern> <category> [--regex] [--priority <n>]");
    };
    let category = ExpenseCategory::from_str(category)?;
    let priority: i32 = flag(args, "--priority")
        .map(|p| p.parse().with_context(|| format!("Invalid priority '{p}'")))
        .transpose()?
        .unwrap_or(0);

    let rule = if has_switch(args, "--regex") {
        compile_pattern(pattern).with_context(|| format!("Invalid regex '{pattern}'"))?;
        VendorRule::new_regex(pattern.to_string(), category)
    } else {
        VendorRule::new_contains(pattern.to_string(), category)
    }
    .with_priority(priority);

    let id = db.insert_vendor_rule(&rule)?;
    println!("Added rule {id}: '{pattern}' → {category}");
    Ok(())
}

fn cli_rules(db: &mut Database) -> Result<()> {
    let rules = db.get_vendor_rules()?;
    if rules.is_empty() {
        println!("No vendor rules");
        return Ok(());
    }

    println!(
        "{:<5} {:<8} {:<6} {:<14} Pattern",
        "ID",
        "Priority",
        "Kind",
        "Category"
    );
    println!("{}", "─".repeat(60));
    for r in &rules {
        println!(
            "{:<5} {:<8} {:<6} {:<14} {}",
            r.id.unwrap_or(0),
            r.priority,
            if r.is_regex { "regex" } else { "text" },
            r.category,
            r.pattern
        );
    }

    let categorizer = Categorizer::new(&rules);
    for bad in categorizer.invalid_rules() {
        eprintln!(
            "Warning: rule {} has an invalid pattern '{}': {}",
            bad.id.unwrap_or(0),
            bad.pattern,
            bad.error
        );
    }
    Ok(())
}

fn cli_rule_delete(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let id = parse_id(pos.first(), "expensesink rule-delete <id>")?;
    if !db.delete_vendor_rule(id)? {
        anyhow::bail!("Rule {id} not found");
    }
    println!("Deleted rule {id}");
    Ok(())
}

// ── Reports ───────────────────────────────────────────────────

#[derive(Serialize)]
struct AlertsReport<'a> {
    alerts: &'a [Alert],
    total_alerts: usize,
}

fn cli_report(kind: &str, args: &[String], db: &mut Database) -> Result<()> {
    let now = as_of(args)?;
    let expenses = db.all_expenses()?;
    match kind {
        "safe-to-spend" | "sts" => {
            let limits = db.get_budgets()?;
            print_json(&engine::compute_safe_to_spend(now, &limits, &expenses))
        }
        "health" => {
            let limits = db.get_budgets()?;
            print_json(&engine::compute_budget_health(now, &limits, &expenses))
        }
        "analysis" => print_json(&engine::compute_budget_analysis(now, &expenses)),
        "overview" => print_json(&engine::compute_overview(now, &expenses)),
        "trends" => print_json(&engine::compute_trends(now, &expenses)),
        "alerts" => {
            let alerts = engine::compute_alerts(now, &expenses);
            print_json(&AlertsReport {
                alerts: &alerts,
                total_alerts: alerts.len(),
            })
        }
        "weekly" => print_json(&engine::compute_weekly_comparison(now, &expenses)),
        other => anyhow::bail!("Unknown report: {other}"),
    }
}

// ── Files ─────────────────────────────────────────────────────

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let month = flag(args, "--month").map(MonthWindow::parse).transpose()?;

    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let suffix = month.map(|m| format!("-{}", m.label())).unwrap_or_default();
            shellexpand(&format!("~/expensesink-export{suffix}.csv"))
        });

    let count = crate::import::export_file(db, Path::new(&output_path), month)?;
    if count == 0 {
        println!("No expenses to export");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let Some(file_path) = pos.first() else {
        anyhow::bail!("Usage: expensesink import <file.csv>");
    };
    let path = PathBuf::from(shellexpand(file_path));
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let report = crate::import::import_file(db, &path, now_utc())?;
    for err in &report.errors {
        eprintln!("Skipped {err}");
    }
    println!(
        "Imported {} expenses ({} rows skipped)",
        report.expenses.len(),
        report.errors.len()
    );
    Ok(())
}

// ── Config ────────────────────────────────────────────────────

#[derive(Serialize)]
struct ConfigReport<'a> {
    config_file: PathBuf,
    database: PathBuf,
    log_file: PathBuf,
    schema_version: i32,
    settings: &'a Config,
}

fn cli_config(args: &[String], db: &Database, config: &Config, dirs: &AppDirs) -> Result<()> {
    match positionals(args).first() {
        Some(&"init") => {
            let path = dirs.config_file();
            if path.exists() {
                anyhow::bail!("Config already exists: {}", path.display());
            }
            Config::default().save_to(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown config action: {other}"),
        None => print_json(&ConfigReport {
            config_file: dirs.config_file(),
            database: config.database_path(dirs),
            log_file: dirs.log_file(),
            schema_version: db.schema_version()?,
            settings: config,
        }),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
