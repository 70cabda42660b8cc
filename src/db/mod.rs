mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, ToSql};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::engine::MonthWindow;
use crate::models::*;

pub(crate) use schema::TIMESTAMP_FORMAT;

pub(crate) struct Database {
    conn: Connection,
}

/// Optional narrowing for `list_expenses`; the default lists everything.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseFilter {
    pub(crate) month: Option<MonthWindow>,
    pub(crate) category: Option<ExpenseCategory>,
    pub(crate) status: Option<ExpenseStatus>,
    pub(crate) search: Option<String>,
    pub(crate) limit: Option<u32>,
}

const EXPENSE_COLUMNS: &str = "id, amount, category, status, vendor, description, created_at";

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::info!(path = %path.display(), "opened database");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                tx.execute_batch(sql)?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    pub(crate) fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        insert_expense_row(&self.conn, expense)?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            id,
            amount = %expense.amount,
            category = %expense.category,
            "inserted expense"
        );
        Ok(id)
    }

    /// Insert all expenses in one transaction; nothing is written if any insert fails.
    pub(crate) fn insert_expenses_batch(&mut self, expenses: &[Expense]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for expense in expenses {
            insert_expense_row(&tx, expense)?;
        }
        tx.commit()?;
        tracing::debug!(count = expenses.len(), "inserted expense batch");
        Ok(expenses.len())
    }

    pub(crate) fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"),
            params![id],
            expense_from_row,
        );
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first.
    pub(crate) fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(month) = &filter.month {
            sql.push_str(&format!(
                " AND created_at >= ?{} AND created_at <= ?{}",
                param_values.len() + 1,
                param_values.len() + 2
            ));
            param_values.push(Box::new(format_timestamp(month.start)));
            param_values.push(Box::new(format_timestamp(month.end)));
        }
        if let Some(category) = filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.as_str()));
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.as_str()));
        }
        if let Some(s) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(
                " AND (vendor LIKE ?{0} OR description LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Every stored expense, oldest first. This is the snapshot the report engines read.
    pub(crate) fn all_expenses(&self) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    /// Returns false when no expense has this id.
    pub(crate) fn update_expense_status(&self, id: i64, status: ExpenseStatus) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE expenses SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        tracing::debug!(id, %status, changed, "updated expense status");
        Ok(changed > 0)
    }

    pub(crate) fn update_expense_category(
        &self,
        id: i64,
        category: ExpenseCategory,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE expenses SET category = ?1 WHERE id = ?2",
            params![category.as_str(), id],
        )?;
        tracing::debug!(id, %category, changed, "updated expense category");
        Ok(changed > 0)
    }

    /// Overwrite every field of the stored expense with `expense.id`.
    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<bool> {
        let Some(id) = expense.id else {
            anyhow::bail!("Cannot update an expense without an id");
        };
        let changed = self.conn.execute(
            "UPDATE expenses
             SET amount = ?1, category = ?2, status = ?3, vendor = ?4, description = ?5, created_at = ?6
             WHERE id = ?7",
            params![
                expense.amount.to_string(),
                expense.category.as_str(),
                expense.status.as_str(),
                expense.vendor,
                expense.description,
                format_timestamp(expense.created_at),
                id,
            ],
        )?;
        tracing::debug!(id, changed, "updated expense");
        Ok(changed > 0)
    }

    pub(crate) fn delete_expense(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        tracing::debug!(id, changed, "deleted expense");
        Ok(changed > 0)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Budget limits in category order.
    pub(crate) fn get_budgets(&self) -> Result<Vec<BudgetLimit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category, monthly_limit FROM budgets")?;
        let rows = stmt.query_map([], |row| {
            let mut budget = BudgetLimit::new(parse_column(row, 1)?, parse_column(row, 2)?)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                })?;
            budget.id = Some(row.get(0)?);
            Ok(budget)
        })?;
        let mut budgets = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        budgets.sort_by_key(|b| b.category);
        Ok(budgets)
    }

    /// Insert or replace the limit for `budget.category`.
    pub(crate) fn upsert_budget(&self, budget: &BudgetLimit) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budgets (category, monthly_limit)
             VALUES (?1, ?2)
             ON CONFLICT(category) DO UPDATE SET monthly_limit = ?2",
            params![budget.category.as_str(), budget.monthly_limit.to_string()],
        )?;
        tracing::debug!(
            category = %budget.category,
            limit = %budget.monthly_limit,
            "saved budget"
        );
        Ok(())
    }

    pub(crate) fn delete_budget(&self, category: ExpenseCategory) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE category = ?1",
            params![category.as_str()],
        )?;
        tracing::debug!(%category, changed, "deleted budget");
        Ok(changed > 0)
    }

    // ── Vendor Rules ──────────────────────────────────────────

    /// Highest priority first.
    pub(crate) fn get_vendor_rules(&self) -> Result<Vec<VendorRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pattern, category, is_regex, priority FROM vendor_rules ORDER BY priority DESC, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VendorRule {
                id: Some(row.get(0)?),
                pattern: row.get(1)?,
                category: parse_column(row, 2)?,
                is_regex: row.get(3)?,
                priority: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_vendor_rule(&self, rule: &VendorRule) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO vendor_rules (pattern, category, is_regex, priority)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                rule.pattern,
                rule.category.as_str(),
                rule.is_regex,
                rule.priority,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, pattern = %rule.pattern, "inserted vendor rule");
        Ok(id)
    }

    pub(crate) fn delete_vendor_rule(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM vendor_rules WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn insert_expense_row(conn: &Connection, expense: &Expense) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO expenses (amount, category, status, vendor, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            expense.amount.to_string(),
            expense.category.as_str(),
            expense.status.as_str(),
            expense.vendor,
            expense.description,
            format_timestamp(expense.created_at),
        ],
    )
}

pub(crate) fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
}

/// Read a TEXT column through `FromStr`. Bad text becomes a conversion error
/// rather than a default value.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let created_at: String = row.get(6)?;
    Ok(Expense {
        id: Some(row.get(0)?),
        amount: parse_column::<Decimal>(row, 1)?,
        category: parse_column(row, 2)?,
        status: parse_column(row, 3)?,
        vendor: row.get(4)?,
        description: row.get(5)?,
        created_at: parse_timestamp(&created_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
    })
}
