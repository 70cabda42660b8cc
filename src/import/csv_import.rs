use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use super::CSV_HEADER;
use crate::categorize::Categorizer;
use crate::db::{parse_timestamp, Database};
use crate::models::{Expense, ExpenseCategory, ExpenseDraft, ExpenseStatus};

/// A CSV row that could not be turned into an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowError {
    /// 1-based line in the file, counting the header.
    pub(crate) line: usize,
    pub(crate) message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ImportReport {
    pub(crate) expenses: Vec<Expense>,
    pub(crate) errors: Vec<RowError>,
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Parse and validate every row. Bad rows are collected in `errors`
    /// and do not stop the rest of the file. Rows without a category are
    /// matched against the vendor rules.
    pub(crate) fn read<R: Read>(
        reader: R,
        categorizer: &Categorizer,
        now: NaiveDateTime,
    ) -> Result<ImportReport> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?;
        let matches_layout = headers.len() == CSV_HEADER.len()
            && headers
                .iter()
                .zip(CSV_HEADER)
                .all(|(got, want)| got.trim().eq_ignore_ascii_case(want));
        if !matches_layout {
            anyhow::bail!("Unexpected CSV header, expected: {}", CSV_HEADER.join(","));
        }

        let mut report = ImportReport::default();
        let mut lines = Vec::new();
        let mut drafts = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let line = i + 2;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    report.errors.push(RowError {
                        line,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let fields: Vec<&str> = record.iter().map(str::trim).collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }

            match parse_row(&fields) {
                Ok(draft) => {
                    lines.push(line);
                    drafts.push(draft);
                }
                Err(message) => report.errors.push(RowError { line, message }),
            }
        }

        let matched = categorizer.categorize_drafts(&mut drafts);
        tracing::debug!(matched, rows = drafts.len(), "categorized imported rows");

        for (line, draft) in lines.into_iter().zip(drafts) {
            match draft.validate(now) {
                Ok(expense) => report.expenses.push(expense),
                Err(e) => report.errors.push(RowError {
                    line,
                    message: e.to_string(),
                }),
            }
        }
        report.errors.sort_by_key(|e| e.line);

        Ok(report)
    }
}

/// Read `path`, insert every valid row in a single transaction and report
/// the rows that were rejected.
pub(crate) fn import_file(
    db: &mut Database,
    path: &Path,
    now: NaiveDateTime,
) -> Result<ImportReport> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let categorizer = Categorizer::new(&db.get_vendor_rules()?);
    let report = CsvImporter::read(file, &categorizer, now)?;

    for err in &report.errors {
        tracing::warn!(line = err.line, reason = %err.message, "rejected CSV row");
    }
    db.insert_expenses_batch(&report.expenses)
        .context("Failed to save imported expenses")?;
    tracing::info!(
        imported = report.expenses.len(),
        rejected = report.errors.len(),
        path = %path.display(),
        "imported expenses"
    );
    Ok(report)
}

fn parse_row(fields: &[&str]) -> std::result::Result<ExpenseDraft, String> {
    let field = |idx: usize| fields.get(idx).copied().unwrap_or("");

    let created_at = match field(1) {
        "" => None,
        s => Some(parse_datetime(s)?),
    };
    let amount = parse_decimal(field(2))?;
    let category = match field(3) {
        "" => None,
        s => Some(ExpenseCategory::from_str(s).map_err(|e| e.to_string())?),
    };
    let status = match field(4) {
        "" => None,
        s => Some(ExpenseStatus::from_str(s).map_err(|e| e.to_string())?),
    };

    Ok(ExpenseDraft {
        amount,
        category,
        status,
        vendor: field(5).to_string(),
        description: field(6).to_string(),
        created_at,
    })
}

/// Full timestamps as exported, or a bare date at midnight.
pub(crate) fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_timestamp(s)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| format!("Could not parse date '{s}'"))
}

pub(crate) fn parse_decimal(s: &str) -> std::result::Result<Decimal, String> {
    let cleaned = s.replace(['$', ',', '"'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err("Missing amount".into());
    }
    Decimal::from_str(cleaned).map_err(|_| format!("Could not parse amount '{s}'"))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
