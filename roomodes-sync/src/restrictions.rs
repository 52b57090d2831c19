//! Restricted groups the next write would drop or alter.
//!
//! A restricted group carries a `fileRegex` and/or `description`, in either
//! the pair form (`- [edit, {fileRegex: ...}]`) or the keyed form
//! (`- edit: {fileRegex: ...}`). Before an artifact is replaced, every
//! restriction in the current file is looked up by slug and group in the
//! new render; missing or different ones become sync warnings.

use std::io::ErrorKind;
use std::path::Path;

use serde_yaml::Value;
use tracing::warn;

/// One restriction attached to one group of one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedGroup {
    pub slug: String,
    pub group: String,
    pub file_regex: Option<String>,
    pub description: Option<String>,
}

impl RestrictedGroup {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(re) = &self.file_regex {
            parts.push(format!("fileRegex '{re}'"));
        }
        if let Some(d) = &self.description {
            parts.push(format!("description '{d}'"));
        }
        parts.join(", ")
    }
}

/// Restricted groups of an artifact document, in document order.
///
/// Anything that is not a restricted group (plain tags, odd shapes, a
/// document without `customModes`) is skipped.
pub fn restricted_groups(text: &str) -> Result<Vec<RestrictedGroup>, serde_yaml::Error> {
    let doc: Value = serde_yaml::from_str(text)?;
    let Some(modes) = doc.get("customModes").and_then(Value::as_sequence) else {
        return Ok(vec![]);
    };

    let mut found = Vec::new();
    for mode in modes {
        let slug = mode.get("slug").and_then(Value::as_str).unwrap_or("<unnamed>");
        let Some(groups) = mode.get("groups").and_then(Value::as_sequence) else {
            continue;
        };
        for entry in groups {
            match entry {
                Value::Sequence(pair) => {
                    if let [Value::String(group), restriction] = pair.as_slice() {
                        found.extend(restriction_of(slug, group, restriction));
                    }
                }
                Value::Mapping(map) => {
                    for (group, restriction) in map {
                        if let Some(group) = group.as_str() {
                            found.extend(restriction_of(slug, group, restriction));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(found)
}

fn restriction_of(slug: &str, group: &str, value: &Value) -> Option<RestrictedGroup> {
    let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
    let file_regex = field("fileRegex");
    let description = field("description");
    if file_regex.is_none() && description.is_none() {
        return None;
    }
    Some(RestrictedGroup {
        slug: slug.to_owned(),
        group: group.to_owned(),
        file_regex,
        description,
    })
}

/// One warning per restriction in `existing` that `rendered` removes or
/// changes. An `existing` document that does not parse yields none.
pub fn restriction_changes(existing: &str, rendered: &str) -> Vec<String> {
    let before = match restricted_groups(existing) {
        Ok(groups) => groups,
        Err(e) => {
            warn!("cannot inspect existing artifact for restricted groups: {e}");
            return vec![];
        }
    };
    let after = restricted_groups(rendered).unwrap_or_default();

    before
        .iter()
        .filter_map(|old| {
            let new = after
                .iter()
                .find(|n| n.slug == old.slug && n.group == old.group);
            match new {
                None => Some(format!(
                    "mode '{}' group '{}': {} will be removed",
                    old.slug,
                    old.group,
                    old.describe()
                )),
                Some(new) if new != old => Some(format!(
                    "mode '{}' group '{}': {} will become {}",
                    old.slug,
                    old.group,
                    old.describe(),
                    new.describe()
                )),
                Some(_) => None,
            }
        })
        .collect()
}

/// [`restriction_changes`] against the artifact currently at `path`.
/// A missing or unreadable file yields no warnings.
pub fn check_existing_artifact(path: &Path, rendered: &str) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(existing) => restriction_changes(&existing, rendered),
        Err(e) if e.kind() == ErrorKind::NotFound => vec![],
        Err(e) => {
            warn!(path = %path.display(), "cannot read existing artifact: {e}");
            vec![]
        }
    }
}
