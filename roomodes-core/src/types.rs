//! Domain types for mode definitions.
//!
//! A [`Mode`] is parsed from one YAML file. `category`, `source` and `origin`
//! are assigned by whoever loaded it and never come from the file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique identifier of a mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Precedence bucket for a mode. Declaration order is the natural order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Core,
    Enhanced,
    Specialized,
    #[default]
    Discovered,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Core,
        Category::Enhanced,
        Category::Specialized,
        Category::Discovered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Enhanced => "enhanced",
            Category::Specialized => "specialized",
            Category::Discovered => "discovered",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownCategory {
                value: s.to_owned(),
            })
    }
}

/// Where a mode was loaded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSource {
    #[default]
    Global,
    Local,
}

impl fmt::Display for ModeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSource::Global => write!(f, "global"),
            ModeSource::Local => write!(f, "local"),
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// The object half of a restricted group entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRestriction {
    #[serde(rename = "fileRegex", default, skip_serializing_if = "Option::is_none")]
    pub file_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of a mode's `groups` list.
///
/// Shapes that match none of the accepted forms land in `Other` so the
/// validator can report them instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupEntry {
    /// `- read`
    Tag(String),
    /// `- [edit, {fileRegex: ..., description: ...}]`
    Restricted(String, GroupRestriction),
    /// `- edit: {fileRegex: ..., description: ...}`
    Keyed(BTreeMap<String, GroupRestriction>),
    Other(serde_yaml::Value),
}

impl GroupEntry {
    pub fn tag(tag: &str) -> Self {
        GroupEntry::Tag(tag.to_owned())
    }

    pub fn restricted(tag: &str, file_regex: &str, description: &str) -> Self {
        GroupEntry::Restricted(
            tag.to_owned(),
            GroupRestriction {
                file_regex: Some(file_regex.to_owned()),
                description: Some(description.to_owned()),
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// A single mode definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Mode {
    #[serde(default)]
    pub slug: Slug,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "roleDefinition", default)]
    pub role_definition: String,
    #[serde(rename = "whenToUse", default)]
    pub when_to_use: Option<String>,
    #[serde(rename = "customInstructions", default)]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    /// Top-level keys outside the schema, kept for the validator.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip)]
    pub category: Category,
    #[serde(skip)]
    pub source: ModeSource,
    /// The file this mode was parsed from.
    #[serde(skip)]
    pub origin: PathBuf,
}

impl Mode {
    /// Minimal valid mode, mostly useful for tests and fixtures.
    pub fn new(slug: &str, name: &str, role_definition: &str) -> Self {
        Self {
            slug: Slug::from(slug),
            name: name.to_owned(),
            role_definition: role_definition.to_owned(),
            groups: vec![GroupEntry::tag("read")],
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// CategorizedModeSet
// ---------------------------------------------------------------------------

/// Modes bucketed by category. Within a bucket, insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedModeSet {
    buckets: BTreeMap<Category, Vec<Mode>>,
}

impl CategorizedModeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `mode` to the bucket named by its `category` field.
    pub fn insert(&mut self, mode: Mode) {
        self.buckets.entry(mode.category).or_default().push(mode);
    }

    pub fn get(&self, category: Category) -> &[Mode] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every mode, categories in natural order, insertion order within.
    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.buckets.values().flatten()
    }

    pub fn find(&self, slug: &str) -> Option<&Mode> {
        self.iter().find(|m| m.slug.as_str() == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.find(slug).is_some()
    }

    /// Categories that hold at least one mode, in natural order.
    pub fn categories(&self) -> Vec<Category> {
        self.buckets
            .iter()
            .filter(|(_, modes)| !modes.is_empty())
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the modes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Mode) -> bool) {
        for modes in self.buckets.values_mut() {
            modes.retain(|m| keep(m));
        }
        self.buckets.retain(|_, modes| !modes.is_empty());
    }
}

impl FromIterator<Mode> for CategorizedModeSet {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        let mut set = Self::new();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_in(slug: &str, category: Category) -> Mode {
        Mode {
            category,
            ..Mode::new(slug, slug, "role")
        }
    }

    #[test]
    fn slug_display() {
        assert_eq!(Slug::from("code").to_string(), "code");
        assert_eq!(Slug::from(String::from("a-b")), Slug::from("a-b"));
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Core".parse::<Category>().unwrap(), Category::Core);
        assert_eq!(" specialized ".parse::<Category>().unwrap(), Category::Specialized);
        assert!(matches!(
            "misc".parse::<Category>(),
            Err(ConfigurationError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn category_natural_order() {
        let mut cats = vec![Category::Discovered, Category::Core, Category::Specialized];
        cats.sort();
        assert_eq!(
            cats,
            vec![Category::Core, Category::Specialized, Category::Discovered]
        );
    }

    #[test]
    fn mode_parses_camel_case_keys() {
        let yaml = "slug: code\nname: Code\nroleDefinition: You write code.\nwhenToUse: Always\ngroups:\n  - read\n";
        let mode: Mode = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(mode.slug, Slug::from("code"));
        assert_eq!(mode.role_definition, "You write code.");
        assert_eq!(mode.when_to_use.as_deref(), Some("Always"));
        assert_eq!(mode.groups, vec![GroupEntry::tag("read")]);
        assert!(mode.extra.is_empty());
    }

    #[test]
    fn mode_keeps_unknown_keys() {
        let yaml = "slug: x\nname: X\nroleDefinition: r\ngroups: [read]\nmodel: claude\ncolour: red\n";
        let mode: Mode = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(mode.extra.len(), 2);
        assert!(mode.extra.contains_key("model"));
        assert!(mode.extra.contains_key("colour"));
    }

    #[test]
    fn group_entry_shapes() {
        let yaml = r#"
- read
- [edit, {fileRegex: '\.md$', description: Markdown}]
- edit:
    fileRegex: '\.rs$'
    description: Rust
- 42
"#;
        let groups: Vec<GroupEntry> = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(groups[0], GroupEntry::tag("read"));
        assert_eq!(groups[1], GroupEntry::restricted("edit", r"\.md$", "Markdown"));
        match &groups[2] {
            GroupEntry::Keyed(map) => {
                let restriction = &map["edit"];
                assert_eq!(restriction.file_regex.as_deref(), Some(r"\.rs$"));
            }
            other => panic!("expected keyed entry, got {other:?}"),
        }
        assert!(matches!(groups[3], GroupEntry::Other(_)));
    }

    #[test]
    fn restricted_entry_serializes_as_pair() {
        let entry = GroupEntry::restricted("edit", r"\.md$", "Markdown");
        let yaml = serde_yaml::to_string(&entry).expect("serialize");
        let back: GroupEntry = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(back, entry);
        assert!(yaml.starts_with("- edit"));
    }

    #[test]
    fn set_preserves_insertion_order_within_category() {
        let set: CategorizedModeSet = vec![
            mode_in("zeta", Category::Discovered),
            mode_in("code", Category::Core),
            mode_in("alpha", Category::Discovered),
        ]
        .into_iter()
        .collect();

        let slugs: Vec<&str> = set.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["code", "zeta", "alpha"]);
        assert_eq!(set.categories(), vec![Category::Core, Category::Discovered]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn retain_drops_empty_buckets() {
        let mut set: CategorizedModeSet = vec![
            mode_in("code", Category::Core),
            mode_in("x", Category::Discovered),
        ]
        .into_iter()
        .collect();
        set.retain(|m| m.slug.as_str() != "code");
        assert_eq!(set.categories(), vec![Category::Discovered]);
        assert!(set.get(Category::Core).is_empty());
    }
}
