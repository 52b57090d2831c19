//! Schema checks for a parsed [`Mode`].
//!
//! Validation is pure: it never touches the filesystem and never stops at the
//! first problem. Every reason is collected into a [`ValidationReport`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;

use crate::error::ConfigurationError;
use crate::types::{GroupEntry, GroupRestriction, Mode, Slug};

/// Group tags understood by the host application.
pub const GROUP_TAGS: &[&str] = &["read", "edit", "browser", "command", "mcp"];

/// Keys that may appear in mode files but are never written to the artifact.
pub const DEVELOPMENT_METADATA_KEYS: &[&str] = &["source", "model"];

/// How unknown top-level keys are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationLevel {
    /// Unknown keys are warnings.
    #[default]
    Normal,
    /// Unknown keys are errors.
    Strict,
}

impl FromStr for ValidationLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ValidationLevel::Normal),
            "strict" => Ok(ValidationLevel::Strict),
            _ => Err(ConfigurationError::UnknownValidationLevel {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Normal => write!(f, "normal"),
            ValidationLevel::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub slug: Slug,
    pub path: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// A report holding a single error, for failures found outside the
    /// schema check (duplicate slugs).
    pub fn failed(slug: Slug, path: PathBuf, error: String) -> Self {
        Self {
            slug,
            path,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    level: ValidationLevel,
}

impl Validator {
    pub fn new(level: ValidationLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn validate(&self, mode: &Mode) -> ValidationReport {
        let mut report = ValidationReport {
            slug: mode.slug.clone(),
            path: mode.origin.clone(),
            ..ValidationReport::default()
        };

        if mode.slug.as_str().is_empty() {
            report.errors.push("missing required field 'slug'".to_owned());
        } else if !is_valid_slug(mode.slug.as_str()) {
            report.errors.push(format!(
                "slug '{}' must be lowercase letters and digits separated by single hyphens",
                mode.slug
            ));
        }
        if mode.name.trim().is_empty() {
            report.errors.push("field 'name' is missing or empty".to_owned());
        }
        if mode.role_definition.trim().is_empty() {
            report
                .errors
                .push("field 'roleDefinition' is missing or empty".to_owned());
        }
        for (key, value) in [
            ("whenToUse", &mode.when_to_use),
            ("customInstructions", &mode.custom_instructions),
        ] {
            if matches!(value, Some(text) if text.trim().is_empty()) {
                report.errors.push(format!("field '{key}' cannot be empty"));
            }
        }

        if mode.groups.is_empty() {
            report.errors.push("field 'groups' is missing or empty".to_owned());
        }
        for (index, entry) in mode.groups.iter().enumerate() {
            check_group(index, entry, &mut report);
        }

        for key in mode.extra.keys() {
            if DEVELOPMENT_METADATA_KEYS.contains(&key.as_str()) {
                continue;
            }
            let message = format!("unexpected field '{key}'");
            match self.level {
                ValidationLevel::Normal => report.warnings.push(message),
                ValidationLevel::Strict => report.errors.push(message),
            }
        }

        report
    }

    /// One report per mode, in input order.
    pub fn validate_all<'a>(&self, modes: impl IntoIterator<Item = &'a Mode>) -> Vec<ValidationReport> {
        modes.into_iter().map(|m| self.validate(m)).collect()
    }
}

/// Validates at [`ValidationLevel::Normal`].
pub fn validate(mode: &Mode) -> ValidationReport {
    Validator::default().validate(mode)
}

// ---------------------------------------------------------------------------
// Group checks
// ---------------------------------------------------------------------------

fn check_group(index: usize, entry: &GroupEntry, report: &mut ValidationReport) {
    match entry {
        GroupEntry::Tag(tag) => check_tag(index, tag, report),
        GroupEntry::Restricted(tag, restriction) => {
            check_tag(index, tag, report);
            check_restriction(index, tag, restriction, report);
        }
        GroupEntry::Keyed(map) => {
            if map.len() != 1 {
                report.errors.push(format!(
                    "groups[{index}]: restricted group must have exactly one key, found {}",
                    map.len()
                ));
            }
            for (tag, restriction) in map {
                check_tag(index, tag, report);
                check_restriction(index, tag, restriction, report);
            }
        }
        GroupEntry::Other(value) => {
            let shape = serde_yaml::to_string(value)
                .map(|s| s.trim().to_owned())
                .unwrap_or_else(|_| "?".to_owned());
            report.errors.push(format!(
                "groups[{index}]: unsupported group entry '{shape}'"
            ));
        }
    }
}

fn check_tag(index: usize, tag: &str, report: &mut ValidationReport) {
    if !GROUP_TAGS.contains(&tag) {
        report.errors.push(format!(
            "groups[{index}]: invalid group '{tag}'; expected one of: {}",
            GROUP_TAGS.join(", ")
        ));
    }
}

fn check_restriction(
    index: usize,
    tag: &str,
    restriction: &GroupRestriction,
    report: &mut ValidationReport,
) {
    match restriction.file_regex.as_deref() {
        None => report.errors.push(format!(
            "groups[{index}]: restricted group '{tag}' is missing 'fileRegex'"
        )),
        Some(pattern) => {
            if let Err(e) = Regex::new(pattern) {
                // Look-around and backreferences are valid for the host but
                // unsupported here; those cannot be checked, so only warn.
                let message = e.to_string();
                if message.contains("not supported") {
                    report.warnings.push(format!(
                        "groups[{index}]: fileRegex '{pattern}' could not be checked: unsupported syntax"
                    ));
                } else {
                    report.errors.push(format!(
                        "groups[{index}]: fileRegex '{pattern}' does not compile: {}",
                        message.lines().last().unwrap_or_default().trim()
                    ));
                }
            }
        }
    }
    if restriction
        .description
        .as_deref()
        .map(|d| d.trim().is_empty())
        .unwrap_or(true)
    {
        report.errors.push(format!(
            "groups[{index}]: restricted group '{tag}' is missing 'description'"
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Mode {
        serde_yaml::from_str(yaml).expect("parse")
    }

    #[test]
    fn minimal_mode_is_valid() {
        let report = validate(&Mode::new("code", "Code", "You write code."));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn slug_pattern() {
        assert!(is_valid_slug("code"));
        assert!(is_valid_slug("code-v2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Code"));
        assert!(!is_valid_slug("code--x"));
        assert!(!is_valid_slug("-code"));
        assert!(!is_valid_slug("code_x"));
    }

    #[test]
    fn collects_every_missing_field() {
        let report = validate(&parse("groups: []\n"));
        assert!(!report.is_valid());
        let joined = report.errors.join("\n");
        assert!(joined.contains("'slug'"));
        assert!(joined.contains("'name'"));
        assert!(joined.contains("'roleDefinition'"));
        assert!(joined.contains("'groups'"));
    }

    #[test]
    fn empty_optional_text_is_error() {
        let mut mode = Mode::new("code", "Code", "role");
        mode.when_to_use = Some("  ".to_owned());
        let report = validate(&mode);
        assert_eq!(report.errors, vec!["field 'whenToUse' cannot be empty"]);
    }

    #[test]
    fn unknown_group_tag() {
        let mut mode = Mode::new("code", "Code", "role");
        mode.groups = vec![GroupEntry::tag("read"), GroupEntry::tag("write")];
        let report = validate(&mode);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("invalid group 'write'"));
    }

    #[test]
    fn restricted_groups() {
        let mode = parse(
            r#"
slug: docs-writer
name: Docs
roleDefinition: Writes docs
groups:
  - read
  - [edit, {fileRegex: '\.(md|mdx)$', description: Markdown files}]
  - command:
      fileRegex: '^scripts/'
      description: Scripts only
"#,
        );
        let report = validate(&mode);
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn restricted_group_problems() {
        let mode = parse(
            r#"
slug: broken
name: Broken
roleDefinition: r
groups:
  - [edit, {fileRegex: '(unclosed'}]
  - [edit, {description: no regex}]
  - [1, 2, 3]
"#,
        );
        let report = validate(&mode);
        let joined = report.errors.join("\n");
        assert!(joined.contains("groups[0]: fileRegex '(unclosed' does not compile"));
        assert!(joined.contains("groups[0]: restricted group 'edit' is missing 'description'"));
        assert!(joined.contains("groups[1]: restricted group 'edit' is missing 'fileRegex'"));
        assert!(joined.contains("groups[2]: unsupported group entry"));
    }

    #[test]
    fn lookaround_is_a_warning() {
        let mut mode = Mode::new("code", "Code", "role");
        mode.groups = vec![GroupEntry::restricted("edit", r"^(?!secret).*\.md$", "Docs")];
        let report = validate(&mode);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn unknown_keys_follow_level() {
        let mode = parse("slug: x\nname: X\nroleDefinition: r\ngroups: [read]\ncolour: red\nmodel: m\n");

        let normal = Validator::new(ValidationLevel::Normal).validate(&mode);
        assert!(normal.is_valid());
        assert_eq!(normal.warnings, vec!["unexpected field 'colour'"]);

        let strict = Validator::new(ValidationLevel::Strict).validate(&mode);
        assert_eq!(strict.errors, vec!["unexpected field 'colour'"]);
    }

    #[test]
    fn validate_all_reports_each_mode() {
        let good = Mode::new("good", "Good", "r");
        let bad = Mode::new("bad", "", "r");
        let reports = Validator::default().validate_all([&good, &bad, &good]);
        let valid: Vec<bool> = reports.iter().map(ValidationReport::is_valid).collect();
        assert_eq!(valid, vec![true, false, true]);
    }

    #[test]
    fn level_from_str() {
        assert_eq!("STRICT".parse::<ValidationLevel>().unwrap(), ValidationLevel::Strict);
        assert!("loose".parse::<ValidationLevel>().is_err());
    }
}
