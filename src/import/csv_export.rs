use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::CSV_HEADER;
use crate::db::{format_timestamp, Database, ExpenseFilter};
use crate::engine::MonthWindow;
use crate::models::Expense;

/// Write expenses with a header row. Returns the number of data rows.
pub(crate) fn write_expenses<W: Write>(writer: W, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for e in expenses {
        wtr.write_record([
            e.id.map(|id| id.to_string()).unwrap_or_default(),
            format_timestamp(e.created_at),
            e.amount.to_string(),
            e.category.as_str().to_string(),
            e.status.as_str().to_string(),
            e.vendor.clone(),
            e.description.clone(),
        ])
        .context("Failed to write CSV record")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(expenses.len())
}

/// Export every expense, or one month of them, oldest first.
pub(crate) fn export_file(db: &Database, path: &Path, month: Option<MonthWindow>) -> Result<usize> {
    let mut expenses = db.list_expenses(&ExpenseFilter {
        month,
        ..Default::default()
    })?;
    expenses.reverse();

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_expenses(file, &expenses)?;

    tracing::info!(count, path = %path.display(), "exported expenses");
    Ok(count)
}
