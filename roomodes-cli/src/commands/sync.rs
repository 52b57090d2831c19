//! `roomodes sync-global` / `roomodes sync-local`: merge modes into an artifact.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use roomodes_core::{parse_strategy_argument, Slug};
use roomodes_sync::{
    diff_artifact, paths, BackupRecord, SyncReport, SyncRequest, SyncTarget, WriteResult,
};

use super::{print_warnings, GlobalOpts};

/// Options shared by both sync commands.
#[derive(Args, Debug)]
pub struct SyncOpts {
    /// Ordering strategy name, or a YAML file with `strategy:` and its options.
    #[arg(short = 's', long, default_value = "strategic", value_name = "STRATEGY|FILE")]
    pub strategy: String,

    /// Leave this slug out (repeatable).
    #[arg(long, value_name = "SLUG")]
    pub exclude: Vec<String>,

    /// Put this slug first (repeatable, in order). Replaces the file's priority_first.
    #[arg(long, value_name = "SLUG")]
    pub priority: Vec<String>,

    /// Show what would be written without touching any file.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// With --dry-run, print a unified diff against the current artifact.
    #[arg(long, requires = "dry_run")]
    pub diff: bool,

    /// Do not back up the existing artifact before overwriting it.
    #[arg(short = 'b', long)]
    pub no_backup: bool,

    /// Drop invalid modes with a warning instead of failing.
    #[arg(long)]
    pub skip_invalid: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `roomodes sync-global`.
#[derive(Args, Debug)]
pub struct SyncGlobalArgs {
    /// Global custom_modes.yaml to write [env: ROO_MODES_CONFIG].
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where cache/roo_modes_global_backup lives [default: parent of the modes dir].
    #[arg(short = 'p', long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(flatten)]
    pub opts: SyncOpts,
}

/// Arguments for `roomodes sync-local`.
#[derive(Args, Debug)]
pub struct SyncLocalArgs {
    /// Project whose .roomodes should be written.
    pub project_dir: PathBuf,

    #[command(flatten)]
    pub opts: SyncOpts,
}

impl SyncGlobalArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let config_path = paths::global_artifact_path(self.config.as_deref())
            .context("could not resolve the global custom_modes.yaml path")?;
        let target = SyncTarget::Global { config_path };
        run_sync(global, &target, self.project_dir.as_deref(), &self.opts)
    }
}

impl SyncLocalArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        if !self.project_dir.is_dir() {
            bail!("project directory not found: {}", self.project_dir.display());
        }
        let target = SyncTarget::Local {
            project_dir: self.project_dir,
        };
        run_sync(global, &target, None, &self.opts)
    }
}

// ---------------------------------------------------------------------------
// Shared run
// ---------------------------------------------------------------------------

fn build_request(opts: &SyncOpts) -> Result<SyncRequest> {
    let config = parse_strategy_argument(&opts.strategy)
        .with_context(|| format!("invalid strategy '{}'", opts.strategy))?;
    let mut options = config.options;
    for slug in &opts.exclude {
        let slug = Slug::from(slug.as_str());
        if !options.exclude.contains(&slug) {
            options.exclude.push(slug);
        }
    }
    if !opts.priority.is_empty() {
        options.priority_first = opts.priority.iter().map(|s| Slug::from(s.as_str())).collect();
    }
    Ok(SyncRequest {
        strategy: config.strategy,
        options,
        create_backup: !opts.no_backup,
        dry_run: opts.dry_run,
        skip_invalid: opts.skip_invalid,
    })
}

fn run_sync(
    global: &GlobalOpts,
    target: &SyncTarget,
    backup_root: Option<&Path>,
    opts: &SyncOpts,
) -> Result<()> {
    let request = build_request(opts)?;
    let mut engine = global.engine(None)?;
    if let Some(root) = backup_root {
        engine = engine.with_backup_root(root);
    }

    let report = engine
        .sync(target, &request)
        .with_context(|| format!("sync to {} failed", target.output_path().display()))?;

    print_warnings(&report.warnings);

    if opts.json {
        print_json(&report)?;
    } else {
        print_report(&report, opts.dry_run);
    }

    if opts.diff {
        match diff_artifact(&report.target, &report.rendered)? {
            Some(diff) => {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
            None => println!("No differences for {}.", report.target.display()),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn outcome_key(write: &WriteResult) -> &'static str {
    match write {
        WriteResult::Written { .. } => "written",
        WriteResult::Unchanged { .. } => "unchanged",
        WriteResult::WouldWrite { .. } => "would_write",
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let categories: Vec<&str> = report.categories.iter().map(|c| c.as_str()).collect();
    println!(
        "{prefix}✓ {} mode(s) → {} (strategy: {})",
        report.modes_written(),
        report.target.display(),
        report.strategy
    );
    println!("  categories: {}", categories.join(", "));
    if let Some(backup) = &report.backup {
        println!("  backup #{}: {}", backup.number, backup.path.display());
    }
    match &report.write {
        WriteResult::Written { path } => println!("  ✎  {}", path.display()),
        WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
        WriteResult::Unchanged { path } => println!("  ·  {} (unchanged)", path.display()),
    }
}

#[derive(Serialize)]
struct SyncReportJson<'a> {
    target: &'a Path,
    strategy: &'a str,
    outcome: &'static str,
    modes: &'a [Slug],
    categories: Vec<&'static str>,
    digest: &'a str,
    backup: Option<&'a BackupRecord>,
    warnings: &'a [String],
}

fn print_json(report: &SyncReport) -> Result<()> {
    let payload = SyncReportJson {
        target: &report.target,
        strategy: report.strategy.name(),
        outcome: outcome_key(&report.write),
        modes: &report.modes,
        categories: report.categories.iter().map(|c| c.as_str()).collect(),
        digest: &report.digest,
        backup: report.backup.as_ref(),
        warnings: &report.warnings,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
    );
    Ok(())
}
