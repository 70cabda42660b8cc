use super::ExpenseCategory;

/// Maps a vendor or description pattern to a category suggestion.
#[derive(Debug, Clone)]
pub(crate) struct VendorRule {
    pub(crate) id: Option<i64>,
    pub(crate) pattern: String,
    pub(crate) category: ExpenseCategory,
    pub(crate) is_regex: bool,
    pub(crate) priority: i32,
}

impl VendorRule {
    pub(crate) fn new_contains(pattern: String, category: ExpenseCategory) -> Self {
        Self {
            id: None,
            pattern,
            category,
            is_regex: false,
            priority: 0,
        }
    }

    pub(crate) fn new_regex(pattern: String, category: ExpenseCategory) -> Self {
        Self {
            id: None,
            pattern,
            category,
            is_regex: true,
            priority: 0,
        }
    }

    pub(crate) fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
