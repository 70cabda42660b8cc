use regex::{Regex, RegexBuilder};

use crate::models::{ExpenseCategory, ExpenseDraft, VendorRule};

/// Matches expense vendors and descriptions against vendor rules.
/// Rules are tried in the order given, so callers pass them highest priority first.
pub(crate) struct Categorizer {
    rules: Vec<CompiledRule>,
    invalid: Vec<InvalidRule>,
}

struct CompiledRule {
    pattern: String,
    regex: Option<Regex>,
    category: ExpenseCategory,
}

/// A regex rule that failed to compile and is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidRule {
    pub(crate) id: Option<i64>,
    pub(crate) pattern: String,
    pub(crate) error: String,
}

impl Categorizer {
    pub(crate) fn new(rules: &[VendorRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut invalid = Vec::new();

        for r in rules {
            let regex = if r.is_regex {
                match compile_pattern(&r.pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(
                            pattern = %r.pattern,
                            error = %e,
                            "skipping invalid vendor rule"
                        );
                        invalid.push(InvalidRule {
                            id: r.id,
                            pattern: r.pattern.clone(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            } else {
                None
            };
            compiled.push(CompiledRule {
                pattern: r.pattern.to_lowercase(),
                regex,
                category: r.category,
            });
        }

        Self {
            rules: compiled,
            invalid,
        }
    }

    pub(crate) fn invalid_rules(&self) -> &[InvalidRule] {
        &self.invalid
    }

    /// First rule matching the vendor, then first rule matching the description.
    pub(crate) fn categorize(&self, vendor: &str, description: &str) -> Option<ExpenseCategory> {
        [vendor, description]
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .find_map(|text| self.match_text(text))
    }

    /// Like `categorize`, falling back to `other`.
    pub(crate) fn suggest(&self, vendor: &str, description: &str) -> ExpenseCategory {
        self.categorize(vendor, description)
            .unwrap_or(ExpenseCategory::Other)
    }

    fn match_text(&self, text: &str) -> Option<ExpenseCategory> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| match &rule.regex {
                Some(re) => re.is_match(text),
                None => lower.contains(&rule.pattern),
            })
            .map(|rule| rule.category)
    }

    /// Fill in the category of drafts that have none; returns how many matched a rule.
    pub(crate) fn categorize_drafts(&self, drafts: &mut [ExpenseDraft]) -> usize {
        let mut matched = 0;
        for draft in drafts.iter_mut().filter(|d| d.category.is_none()) {
            if let Some(category) = self.categorize(&draft.vendor, &draft.description) {
                draft.category = Some(category);
                matched += 1;
            }
        }
        matched
    }
}

/// Compile a regex rule pattern, case-insensitively.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Suggest a contains-pattern for a vendor name: the first one or two words,
/// lowercased, with digits and store-number noise removed.
pub(crate) fn suggest_rule(vendor: &str) -> String {
    let cleaned = vendor
        .to_uppercase()
        .replace(|c: char| c.is_ascii_digit(), "")
        .replace('#', "")
        .replace('*', " ");

    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let pattern = match words.as_slice() {
        [first, second, ..] => format!("{first} {second}"),
        [only] => (*only).to_string(),
        [] => vendor.trim().to_string(),
    };

    pattern.to_lowercase()
}
