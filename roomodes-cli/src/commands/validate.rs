//! `roomodes validate`: check every discovered mode and report all findings.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use roomodes_core::{ModeSource, ValidationLevel, ValidationReport};

use super::GlobalOpts;

/// Arguments for `roomodes validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Treat unknown keys as errors (overrides ROO_MODES_VALIDATION_LEVEL).
    #[arg(long)]
    pub strict: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ValidationJson<'a> {
    valid: bool,
    reports: Vec<ReportJson<'a>>,
    skipped: Vec<SkippedJson>,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    valid: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

#[derive(Serialize)]
struct SkippedJson {
    path: String,
    reason: String,
}

impl ValidateArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let level = self.strict.then_some(ValidationLevel::Strict);
        let engine = global.engine(level)?;
        let outcome = engine
            .discover(ModeSource::Global)
            .with_context(|| format!("failed to scan {}", global.modes_dir.display()))?;
        let reports = engine.validate(&outcome);
        let failed = reports.iter().filter(|r| !r.is_valid()).count();

        if self.json {
            let payload = ValidationJson {
                valid: failed == 0,
                reports: reports
                    .iter()
                    .map(|report| ReportJson {
                        valid: report.is_valid(),
                        report,
                    })
                    .collect(),
                skipped: outcome
                    .warnings
                    .iter()
                    .map(|w| SkippedJson {
                        path: w.path.display().to_string(),
                        reason: w.reason.clone(),
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize validation JSON")?
            );
        } else {
            for report in &reports {
                print_report(report);
            }
            for skipped in &outcome.warnings {
                println!(
                    "{} {} ({})",
                    "skipped".yellow(),
                    skipped.path.display(),
                    skipped.reason
                );
            }
            println!(
                "{} mode(s) checked, {} invalid, {} file(s) skipped",
                reports.len(),
                failed,
                outcome.warnings.len()
            );
        }

        if failed > 0 {
            bail!("{failed} of {} mode(s) failed validation", reports.len());
        }
        Ok(())
    }
}

fn print_report(report: &ValidationReport) {
    let label = if report.slug.as_str().is_empty() {
        "<no slug>".to_owned()
    } else {
        report.slug.to_string()
    };
    if report.is_valid() {
        println!("{} {label}", "✓".green());
    } else {
        println!("{} {label} ({})", "✗".red(), report.path.display());
    }
    for error in &report.errors {
        println!("    {} {error}", "error:".red());
    }
    for warning in &report.warnings {
        println!("    {} {warning}", "warning:".yellow());
    }
}
