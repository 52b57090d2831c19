//! `roomodes list`: discovered modes grouped by category.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use roomodes_core::{Category, ModeSource, ValidationReport};

use super::{print_warnings, GlobalOpts};

/// Arguments for `roomodes list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ModeRow {
    slug: String,
    name: String,
    category: Category,
    path: PathBuf,
    valid: bool,
    errors: Vec<String>,
}

#[derive(Tabled)]
struct ModeTableRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "file")]
    file: String,
}

impl ListArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let engine = global.engine(None)?;
        let outcome = engine
            .discover(ModeSource::Global)
            .with_context(|| format!("failed to scan {}", global.modes_dir.display()))?;
        let reports = engine.validate(&outcome);
        let by_path: HashMap<&Path, &ValidationReport> =
            reports.iter().map(|r| (r.path.as_path(), r)).collect();

        let rows: Vec<ModeRow> = outcome
            .modes
            .iter()
            .map(|mode| {
                let errors = by_path
                    .get(mode.origin.as_path())
                    .map(|r| r.errors.clone())
                    .unwrap_or_default();
                ModeRow {
                    slug: mode.slug.to_string(),
                    name: mode.name.clone(),
                    category: mode.category,
                    path: mode.origin.clone(),
                    valid: errors.is_empty(),
                    errors,
                }
            })
            .collect();

        let mut warnings: Vec<String> = outcome
            .warnings
            .iter()
            .map(|w| format!("skipped {}: {}", w.path.display(), w.reason))
            .collect();
        warnings.extend(outcome.rejected.iter().map(|r| r.reason()));
        print_warnings(&warnings);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize mode list")?
            );
            return Ok(());
        }

        print_table(&global.modes_dir, rows);
        Ok(())
    }
}

fn print_table(root: &Path, rows: Vec<ModeRow>) {
    if rows.is_empty() {
        println!("No modes found in {}.", root.display());
        return;
    }
    let invalid = rows.iter().filter(|r| !r.valid).count();
    println!(
        "{} mode(s) in {} | {} invalid",
        rows.len(),
        root.display(),
        invalid
    );

    for category in Category::ALL {
        let table_rows: Vec<ModeTableRow> = rows
            .iter()
            .filter(|r| r.category == category)
            .map(|r| ModeTableRow {
                slug: r.slug.clone(),
                name: r.name.clone(),
                status: if r.valid {
                    "✓ valid".green().to_string()
                } else {
                    format!("✗ {}", r.errors.len()).red().to_string()
                },
                file: r
                    .path
                    .strip_prefix(root)
                    .unwrap_or(&r.path)
                    .display()
                    .to_string(),
            })
            .collect();
        if table_rows.is_empty() {
            continue;
        }
        println!("{}", category.as_str().to_uppercase().bold());
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if invalid > 0 {
        println!("Run 'roomodes validate' for details.");
    }
}
