#![allow(clippy::unwrap_used)]

use super::*;
use crate::import::csv_export::write_expenses;
use crate::models::VendorRule;
use rust_decimal_macros::dec;
use std::io::Write;

const HEADER: &str = "id,created_at,amount,category,status,vendor,description\n";

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn read(content: &str) -> ImportReport {
    CsvImporter::read(content.as_bytes(), &Categorizer::new(&[]), now()).unwrap()
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("42").unwrap(), dec!(42));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_empty_is_error() {
    assert!(parse_decimal("").is_err());
    assert!(parse_decimal("  ").is_err());
    assert!(parse_decimal("abc").is_err());
}

// ── Row parsing ───────────────────────────────────────────────

#[test]
fn test_read_full_row() {
    let report = read(&format!(
        "{HEADER}7,2024-03-02T08:15:00,45.67,meals,approved,Corner Cafe,Team breakfast\n"
    ));
    assert!(report.errors.is_empty());
    assert_eq!(report.expenses.len(), 1);

    let e = &report.expenses[0];
    assert!(e.id.is_none());
    assert_eq!(e.amount, dec!(45.67));
    assert_eq!(e.category, ExpenseCategory::Meals);
    assert_eq!(e.status, ExpenseStatus::Approved);
    assert_eq!(e.vendor, "Corner Cafe");
    assert_eq!(e.description, "Team breakfast");
    assert_eq!(
        e.created_at.format("%Y-%m-%d %H:%M").to_string(),
        "2024-03-02 08:15"
    );
}

#[test]
fn test_read_defaults_for_blank_fields() {
    let report = read(&format!("{HEADER},,10,,,Somewhere,\n"));
    let e = &report.expenses[0];
    assert_eq!(e.category, ExpenseCategory::Other);
    assert_eq!(e.status, ExpenseStatus::Pending);
    assert_eq!(e.created_at, now());
}

#[test]
fn test_read_date_only() {
    let report = read(&format!("{HEADER},2024-01-05,10,office,,Staples,\n"));
    assert_eq!(
        report.expenses[0].created_at,
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_time(NaiveTime::MIN)
    );
}

#[test]
fn test_read_reports_bad_rows_and_continues() {
    let content = format!(
        "{HEADER}\
         ,2024-03-01T00:00:00,10,meals,,A,\n\
         ,2024-03-01T00:00:00,10,groceries,,B,\n\
         ,2024-03-01T00:00:00,ten,meals,,C,\n\
         ,not-a-date,10,meals,,D,\n\
         ,2024-03-01T00:00:00,0,meals,,E,\n\
         ,2024-03-01T00:00:00,10,meals,reimbursed,F,\n\
         ,2024-03-01T00:00:00,20,travel,,G,\n"
    );
    let report = read(&content);

    let vendors: Vec<_> = report.expenses.iter().map(|e| e.vendor.as_str()).collect();
    assert_eq!(vendors, vec!["A", "G"]);

    let lines: Vec<_> = report.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5, 6, 7]);
    assert!(report.errors[0].message.contains("groceries"));
    assert!(report.errors[1].message.contains("ten"));
    assert!(report.errors[3].message.contains("amount"));
    assert_eq!(
        report.errors[0].to_string(),
        format!("line 3: {}", report.errors[0].message)
    );
}

#[test]
fn test_read_skips_blank_lines() {
    let report = read(&format!("{HEADER},,5,,,X,\n,,,,,,\n"));
    assert_eq!(report.expenses.len(), 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_read_rejects_wrong_header() {
    let result = CsvImporter::read(
        "Date,Description,Amount\n01/15/2024,Coffee,4.50\n".as_bytes(),
        &Categorizer::new(&[]),
        now(),
    );
    assert!(result.is_err());
}

#[test]
fn test_read_applies_vendor_rules() {
    let rules = vec![VendorRule::new_contains("github".into(), ExpenseCategory::Software)];
    let report = CsvImporter::read(
        format!("{HEADER},,9,,,GitHub Inc,\n,,9,meals,,GitHub Inc,\n").as_bytes(),
        &Categorizer::new(&rules),
        now(),
    )
    .unwrap();
    assert_eq!(report.expenses[0].category, ExpenseCategory::Software);
    // an explicit category is kept
    assert_eq!(report.expenses[1].category, ExpenseCategory::Meals);
}

#[test]
fn test_exported_file_reads_back() {
    let original = Expense {
        id: Some(1),
        amount: dec!(99.95),
        category: ExpenseCategory::Marketing,
        status: ExpenseStatus::Rejected,
        vendor: "Print \"Shop\"".into(),
        description: "flyers, posters".into(),
        created_at: now(),
    };
    let mut out = Vec::new();
    write_expenses(&mut out, std::slice::from_ref(&original)).unwrap();

    let report = CsvImporter::read(out.as_slice(), &Categorizer::new(&[]), now()).unwrap();
    let mut expected = original;
    expected.id = None;
    assert_eq!(report.expenses, vec![expected]);
}

// ── import_file ───────────────────────────────────────────────

#[test]
fn test_import_file_inserts_valid_rows() {
    let mut db = Database::open_in_memory().unwrap();
    let file = make_csv_file(&format!(
        "{HEADER},2024-03-01T00:00:00,10,meals,,A,\n,2024-03-01T00:00:00,-4,meals,,B,\n,2024-03-02T00:00:00,30,travel,,C,\n"
    ));
    let report = import_file(&mut db, file.path(), now()).unwrap();
    assert_eq!(report.expenses.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(db.expense_count().unwrap(), 2);
}

#[test]
fn test_import_file_missing() {
    let mut db = Database::open_in_memory().unwrap();
    let result = import_file(&mut db, Path::new("/nonexistent/expenses.csv"), now());
    assert!(result.is_err());
}
