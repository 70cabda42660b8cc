//! Expense backup and restore as CSV.

mod csv_export;
mod csv_import;

pub(crate) use csv_export::export_file;
pub(crate) use csv_import::{import_file, parse_datetime, parse_decimal};

/// Column layout shared by export and import.
pub(crate) const CSV_HEADER: [&str; 7] = [
    "id",
    "created_at",
    "amount",
    "category",
    "status",
    "vendor",
    "description",
];
