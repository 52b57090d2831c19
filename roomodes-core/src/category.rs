//! Slug → category assignment.
//!
//! The table is an explicit value handed to discovery. Exact slug entries are
//! consulted first, then rules in insertion order; the first matching rule
//! wins. Anything unmatched is [`Category::Discovered`].

use std::collections::HashMap;

use regex::Regex;

use crate::error::ConfigurationError;
use crate::types::Category;

/// Slugs that belong to the host application's built-in modes.
pub const CORE_SLUGS: &[&str] = &["code", "architect", "debug", "ask", "orchestrator", "docs"];

#[derive(Debug, Clone)]
enum SlugRule {
    Suffix(String),
    Contains(String),
    Pattern(Regex),
}

impl SlugRule {
    fn matches(&self, slug: &str) -> bool {
        match self {
            SlugRule::Suffix(suffix) => slug.ends_with(suffix.as_str()),
            SlugRule::Contains(needle) => slug.contains(needle.as_str()),
            SlugRule::Pattern(re) => re.is_match(slug),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryTable {
    exact: HashMap<String, Category>,
    rules: Vec<(SlugRule, Category)>,
}

impl Default for CategoryTable {
    /// Core slugs plus the conventional suffixes for enhanced and
    /// specialized variants.
    fn default() -> Self {
        let mut table = Self::empty();
        for slug in CORE_SLUGS {
            table = table.with_slug(slug, Category::Core);
        }
        table
            .with_suffix("-enhanced", Category::Enhanced)
            .with_suffix("-plus", Category::Enhanced)
            .with_suffix("-maintenance", Category::Specialized)
            .with_contains("-enhancer", Category::Specialized)
            .with_suffix("-creator", Category::Specialized)
            .with_suffix("-auditor", Category::Specialized)
    }
}

impl CategoryTable {
    /// A table that files every slug under `discovered`.
    pub fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: &str, category: Category) -> Self {
        self.exact.insert(slug.to_owned(), category);
        self
    }

    pub fn with_suffix(mut self, suffix: &str, category: Category) -> Self {
        self.rules.push((SlugRule::Suffix(suffix.to_owned()), category));
        self
    }

    pub fn with_contains(mut self, needle: &str, category: Category) -> Self {
        self.rules.push((SlugRule::Contains(needle.to_owned()), category));
        self
    }

    /// Adds a regular-expression rule matched against the whole slug.
    pub fn with_pattern(mut self, pattern: &str, category: Category) -> Result<Self, ConfigurationError> {
        let re = Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })?;
        self.rules.push((SlugRule::Pattern(re), category));
        Ok(self)
    }

    pub fn categorize(&self, slug: &str) -> Category {
        if let Some(category) = self.exact.get(slug) {
            return *category;
        }
        self.rules
            .iter()
            .find(|(rule, _)| rule.matches(slug))
            .map(|(_, category)| *category)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_slugs_are_core() {
        let table = CategoryTable::default();
        for slug in CORE_SLUGS {
            assert_eq!(table.categorize(slug), Category::Core, "{slug}");
        }
    }

    #[test]
    fn suffix_rules() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("code-enhanced"), Category::Enhanced);
        assert_eq!(table.categorize("debug-plus"), Category::Enhanced);
        assert_eq!(table.categorize("docs-maintenance"), Category::Specialized);
        assert_eq!(table.categorize("prompt-enhancer-v2"), Category::Specialized);
        assert_eq!(table.categorize("mode-creator"), Category::Specialized);
        assert_eq!(table.categorize("security-auditor"), Category::Specialized);
        assert_eq!(table.categorize("translator"), Category::Discovered);
    }

    #[test]
    fn exact_entry_beats_rule() {
        let table = CategoryTable::default().with_slug("legacy-plus", Category::Specialized);
        assert_eq!(table.categorize("legacy-plus"), Category::Specialized);
    }

    #[test]
    fn empty_table_is_all_discovered() {
        assert_eq!(CategoryTable::empty().categorize("code"), Category::Discovered);
    }

    #[test]
    fn pattern_rule() {
        let table = CategoryTable::empty()
            .with_pattern("^team-", Category::Enhanced)
            .unwrap();
        assert_eq!(table.categorize("team-review"), Category::Enhanced);
        assert_eq!(table.categorize("review-team"), Category::Discovered);
    }

    #[test]
    fn bad_pattern_is_configuration_error() {
        let err = CategoryTable::empty()
            .with_pattern("(unclosed", Category::Core)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }
}
