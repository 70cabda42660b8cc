use thiserror::Error;

/// Errors raised while turning user or stored input into domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ExpenseError {
    #[error("Unknown category '{0}' (expected one of: meals, travel, office, software, marketing, utilities, other)")]
    UnknownCategory(String),
    #[error("Unknown status '{0}' (expected one of: pending, approved, rejected)")]
    UnknownStatus(String),
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Budget limit cannot be negative")]
    NegativeLimit,
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
}

impl ExpenseError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
