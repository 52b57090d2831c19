//! The merged `customModes:` document consumed by the host application.
//!
//! Only schema keys are written. Development metadata and any other
//! unknown keys from the mode files stay behind.

use serde::Serialize;

use roomodes_core::{GroupEntry, Mode, Slug};

use crate::error::SyncError;

#[derive(Serialize)]
struct Artifact<'a> {
    #[serde(rename = "customModes")]
    custom_modes: Vec<ArtifactMode<'a>>,
}

#[derive(Serialize)]
struct ArtifactMode<'a> {
    slug: &'a Slug,
    name: &'a str,
    #[serde(rename = "roleDefinition")]
    role_definition: &'a str,
    #[serde(rename = "whenToUse", skip_serializing_if = "Option::is_none")]
    when_to_use: Option<&'a str>,
    #[serde(rename = "customInstructions", skip_serializing_if = "Option::is_none")]
    custom_instructions: Option<&'a str>,
    groups: &'a [GroupEntry],
}

impl<'a> From<&'a Mode> for ArtifactMode<'a> {
    fn from(mode: &'a Mode) -> Self {
        Self {
            slug: &mode.slug,
            name: &mode.name,
            role_definition: &mode.role_definition,
            when_to_use: mode.when_to_use.as_deref(),
            custom_instructions: mode.custom_instructions.as_deref(),
            groups: &mode.groups,
        }
    }
}

/// Renders `modes`, in the given order, as the artifact YAML text.
pub fn render_artifact(modes: &[Mode]) -> Result<String, SyncError> {
    let artifact = Artifact {
        custom_modes: modes.iter().map(ArtifactMode::from).collect(),
    };
    Ok(serde_yaml::to_string(&artifact)?)
}
