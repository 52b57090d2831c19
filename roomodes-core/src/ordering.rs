//! Ordering strategies: (categorized modes, options) → ordered list.
//!
//! Every strategy runs the same frame:
//! 1. drop `exclude`d slugs
//! 2. strategy-specific arrangement
//! 3. move `priority_first` slugs to the front, in the order listed
//!
//! All option problems surface as [`ConfigurationError`] before any output.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::types::{CategorizedModeSet, Category, Mode, Slug};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithinCategoryOrder {
    /// Keep traversal order.
    #[default]
    #[serde(alias = "default")]
    Discovery,
    Alphabetical,
}

/// Knobs shared by every strategy. Unused fields are ignored by strategies
/// that do not read them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingOptions {
    pub exclude: Vec<Slug>,
    pub priority_first: Vec<Slug>,
    pub category_order: Option<Vec<Category>>,
    pub within_category_order: WithinCategoryOrder,
    pub custom_order: Option<Vec<Slug>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Category precedence, discovery order within each category.
    #[default]
    Strategic,
    /// Category precedence, case-insensitive slug order within.
    Alphabetical,
    /// Caller-chosen category order.
    Category,
    /// Caller-supplied full ordering.
    Custom,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Strategic,
        Strategy::Alphabetical,
        Strategy::Category,
        Strategy::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Strategic => "strategic",
            Strategy::Alphabetical => "alphabetical",
            Strategy::Category => "category",
            Strategy::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigurationError> {
        let wanted = name.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|s| s.name() == wanted)
            .ok_or_else(|| ConfigurationError::UnknownStrategy {
                name: name.to_owned(),
                valid: Strategy::ALL.map(|s| s.name()).join(", "),
            })
    }

    pub fn order(
        &self,
        modes: &CategorizedModeSet,
        options: &OrderingOptions,
    ) -> Result<Vec<Mode>, ConfigurationError> {
        reject_duplicates("priority_first", &options.priority_first)?;
        let excluded: HashSet<&str> = options.exclude.iter().map(Slug::as_str).collect();

        let arranged: Vec<&Mode> = match self {
            Strategy::Strategic => {
                by_categories(modes, &Category::ALL, WithinCategoryOrder::Discovery, &excluded)
            }
            Strategy::Alphabetical => {
                by_categories(modes, &Category::ALL, WithinCategoryOrder::Alphabetical, &excluded)
            }
            Strategy::Category => {
                let order = category_sequence(options.category_order.as_deref())?;
                by_categories(modes, &order, options.within_category_order, &excluded)
            }
            Strategy::Custom => custom(modes, options.custom_order.as_deref(), &excluded)?,
        };

        Ok(apply_priority(arranged, &options.priority_first)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::from_name(s)
    }
}

/// Resolves `strategy_name` and orders `modes` with it.
pub fn order(
    modes: &CategorizedModeSet,
    strategy_name: &str,
    options: &OrderingOptions,
) -> Result<Vec<Mode>, ConfigurationError> {
    Strategy::from_name(strategy_name)?.order(modes, options)
}

// ---------------------------------------------------------------------------
// Arrangements
// ---------------------------------------------------------------------------

fn by_categories<'a>(
    modes: &'a CategorizedModeSet,
    order: &[Category],
    within: WithinCategoryOrder,
    excluded: &HashSet<&str>,
) -> Vec<&'a Mode> {
    let mut out = Vec::with_capacity(modes.len());
    for category in order {
        let mut bucket: Vec<&Mode> = modes
            .get(*category)
            .iter()
            .filter(|m| !excluded.contains(m.slug.as_str()))
            .collect();
        if within == WithinCategoryOrder::Alphabetical {
            bucket.sort_by_cached_key(|m| m.slug.as_str().to_lowercase());
        }
        out.extend(bucket);
    }
    out
}

/// Listed categories first, then the rest in natural order.
fn category_sequence(listed: Option<&[Category]>) -> Result<Vec<Category>, ConfigurationError> {
    let mut sequence: Vec<Category> = Vec::with_capacity(Category::ALL.len());
    for category in listed.unwrap_or_default() {
        if sequence.contains(category) {
            return Err(ConfigurationError::DuplicateEntry {
                option: "category_order",
                value: category.to_string(),
            });
        }
        sequence.push(*category);
    }
    for category in Category::ALL {
        if !sequence.contains(&category) {
            sequence.push(category);
        }
    }
    Ok(sequence)
}

fn custom<'a>(
    modes: &'a CategorizedModeSet,
    custom_order: Option<&[Slug]>,
    excluded: &HashSet<&str>,
) -> Result<Vec<&'a Mode>, ConfigurationError> {
    let listed = custom_order.ok_or(ConfigurationError::MissingOption {
        strategy: "custom",
        option: "custom_order",
    })?;
    reject_duplicates("custom_order", listed)?;

    let mut out = Vec::with_capacity(listed.len());
    for slug in listed {
        let mode = modes
            .find(slug.as_str())
            .ok_or_else(|| ConfigurationError::UnknownSlug {
                option: "custom_order",
                slug: slug.to_string(),
            })?;
        if !excluded.contains(slug.as_str()) {
            out.push(mode);
        }
    }

    let named: HashSet<&str> = listed.iter().map(Slug::as_str).collect();
    let missing: Vec<String> = modes
        .iter()
        .map(|m| m.slug.as_str())
        .filter(|s| !excluded.contains(s) && !named.contains(s))
        .map(str::to_owned)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigurationError::IncompleteCustomOrder { missing });
    }
    Ok(out)
}

fn apply_priority<'a>(arranged: Vec<&'a Mode>, priority: &[Slug]) -> Vec<&'a Mode> {
    if priority.is_empty() {
        return arranged;
    }
    let mut front: Vec<&Mode> = Vec::with_capacity(priority.len());
    for slug in priority {
        if let Some(mode) = arranged.iter().copied().find(|m| m.slug == *slug) {
            front.push(mode);
        }
    }
    let rest = arranged
        .into_iter()
        .filter(|m| !priority.contains(&m.slug));
    front.into_iter().chain(rest).collect()
}

fn reject_duplicates(option: &'static str, slugs: &[Slug]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for slug in slugs {
        if !seen.insert(slug.as_str()) {
            return Err(ConfigurationError::DuplicateEntry {
                option,
                value: slug.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(slug: &str, category: Category) -> Mode {
        Mode {
            category,
            ..Mode::new(slug, slug, "role")
        }
    }

    fn sample() -> CategorizedModeSet {
        vec![
            mode("zeta", Category::Discovered),
            mode("code", Category::Core),
            mode("beta-plus", Category::Enhanced),
            mode("Alpha", Category::Discovered),
            mode("architect", Category::Core),
            mode("mode-creator", Category::Specialized),
        ]
        .into_iter()
        .collect()
    }

    fn slugs(modes: &[Mode]) -> Vec<&str> {
        modes.iter().map(|m| m.slug.as_str()).collect()
    }

    fn slug_list(items: &[&str]) -> Vec<Slug> {
        items.iter().map(|s| Slug::from(*s)).collect()
    }

    #[test]
    fn strategic_keeps_discovery_order() {
        let out = Strategy::Strategic.order(&sample(), &OrderingOptions::default()).unwrap();
        assert_eq!(
            slugs(&out),
            vec!["code", "architect", "beta-plus", "mode-creator", "zeta", "Alpha"]
        );
    }

    #[test]
    fn alphabetical_sorts_case_insensitively_within_category() {
        let out = Strategy::Alphabetical.order(&sample(), &OrderingOptions::default()).unwrap();
        assert_eq!(
            slugs(&out),
            vec!["architect", "code", "beta-plus", "mode-creator", "Alpha", "zeta"]
        );
    }

    #[test]
    fn category_strategy_puts_listed_first() {
        let options = OrderingOptions {
            category_order: Some(vec![Category::Discovered, Category::Specialized]),
            within_category_order: WithinCategoryOrder::Alphabetical,
            ..OrderingOptions::default()
        };
        let out = Strategy::Category.order(&sample(), &options).unwrap();
        assert_eq!(
            slugs(&out),
            vec!["Alpha", "zeta", "mode-creator", "architect", "code", "beta-plus"]
        );
    }

    #[test]
    fn category_strategy_rejects_duplicate_category() {
        let options = OrderingOptions {
            category_order: Some(vec![Category::Core, Category::Core]),
            ..OrderingOptions::default()
        };
        let err = Strategy::Category.order(&sample(), &options).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateEntry { option: "category_order", .. }));
    }

    #[test]
    fn custom_requires_order() {
        let err = Strategy::Custom.order(&sample(), &OrderingOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingOption { .. }));
    }

    #[test]
    fn custom_with_exclusion() {
        let options = OrderingOptions {
            exclude: slug_list(&["zeta"]),
            custom_order: Some(slug_list(&[
                "mode-creator",
                "zeta",
                "Alpha",
                "code",
                "beta-plus",
                "architect",
            ])),
            ..OrderingOptions::default()
        };
        let out = Strategy::Custom.order(&sample(), &options).unwrap();
        assert_eq!(
            slugs(&out),
            vec!["mode-creator", "Alpha", "code", "beta-plus", "architect"]
        );
    }

    #[test]
    fn custom_rejects_unknown_duplicate_and_incomplete() {
        let unknown = OrderingOptions {
            custom_order: Some(slug_list(&["ghost"])),
            ..OrderingOptions::default()
        };
        assert!(matches!(
            Strategy::Custom.order(&sample(), &unknown).unwrap_err(),
            ConfigurationError::UnknownSlug { .. }
        ));

        let duplicate = OrderingOptions {
            custom_order: Some(slug_list(&["code", "code"])),
            ..OrderingOptions::default()
        };
        assert!(matches!(
            Strategy::Custom.order(&sample(), &duplicate).unwrap_err(),
            ConfigurationError::DuplicateEntry { option: "custom_order", .. }
        ));

        let incomplete = OrderingOptions {
            custom_order: Some(slug_list(&["code"])),
            ..OrderingOptions::default()
        };
        match Strategy::Custom.order(&sample(), &incomplete).unwrap_err() {
            ConfigurationError::IncompleteCustomOrder { missing } => assert_eq!(missing.len(), 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn priority_first_moves_to_front_and_ignores_absent() {
        let options = OrderingOptions {
            exclude: slug_list(&["code"]),
            priority_first: slug_list(&["zeta", "code", "ghost", "beta-plus"]),
            ..OrderingOptions::default()
        };
        let out = Strategy::Strategic.order(&sample(), &options).unwrap();
        assert_eq!(
            slugs(&out),
            vec!["zeta", "beta-plus", "architect", "mode-creator", "Alpha"]
        );
    }

    #[test]
    fn duplicate_priority_is_error() {
        let options = OrderingOptions {
            priority_first: slug_list(&["code", "code"]),
            ..OrderingOptions::default()
        };
        assert!(Strategy::Alphabetical.order(&sample(), &options).is_err());
    }

    #[test]
    fn factory_names() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_name(strategy.name()).unwrap(), strategy);
        }
        assert_eq!("Custom".parse::<Strategy>().unwrap(), Strategy::Custom);
        let err = Strategy::from_name("random").unwrap_err().to_string();
        assert!(err.contains("'random'"));
        assert!(err.contains("strategic, alphabetical, category, custom"));
    }

    #[test]
    fn options_from_yaml() {
        let yaml = "exclude: [zeta]\ncategory_order: [specialized, core]\nwithin_category_order: default\n";
        let options: OrderingOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.exclude, slug_list(&["zeta"]));
        assert_eq!(
            options.category_order,
            Some(vec![Category::Specialized, Category::Core])
        );
        assert_eq!(options.within_category_order, WithinCategoryOrder::Discovery);
    }
}
