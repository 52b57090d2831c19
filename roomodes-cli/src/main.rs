//! roomodes: sync mode definitions into Roo's global and project configs.
//!
//! # Usage
//!
//! ```text
//! roomodes [-m <modes-dir>] [-n] [-v] <command>
//! roomodes sync-global [-c <config>] [-s <strategy|file.yaml>] [-d [--diff]] [-b] [--skip-invalid]
//! roomodes sync-local <project-dir> [-s ...] [-d [--diff]] [-b] [--skip-invalid]
//! roomodes list [--json]
//! roomodes validate [--strict] [--json]
//! roomodes backup [-t local|global|custom|all] [-p <project-dir>] [-c <config>]
//! roomodes restore [-t ...] [--number N | -f <backup-file>] [-p <project-dir>]
//! roomodes list-backups [-t ...] [-p <project-dir>] [--json]
//! ```

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    backup::{BackupArgs, ListBackupsArgs, RestoreArgs},
    list::ListArgs,
    sync::{SyncGlobalArgs, SyncLocalArgs},
    validate::ValidateArgs,
    GlobalOpts,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roomodes",
    version,
    about = "Discover, validate, order and sync Roo mode definitions",
    long_about = None,
)]
struct Cli {
    /// Directory holding the mode YAML files [env: ROO_MODES_DIR] [default: ./modes]
    #[arg(short = 'm', long, global = true, value_name = "DIR")]
    modes_dir: Option<PathBuf>,

    /// Only scan the top level of the modes directory.
    #[arg(short = 'n', long, global = true)]
    no_recurse: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge all modes into the global custom_modes.yaml.
    SyncGlobal(SyncGlobalArgs),

    /// Merge all modes into <project>/.roomodes.
    SyncLocal(SyncLocalArgs),

    /// List discovered modes grouped by category.
    List(ListArgs),

    /// Validate every discovered mode and print all findings.
    Validate(ValidateArgs),

    /// Create numbered backups of the mode artifacts.
    Backup(BackupArgs),

    /// Restore an artifact from a numbered backup.
    Restore(RestoreArgs),

    /// List existing backups.
    ListBackups(ListBackupsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let opts = GlobalOpts::resolve(cli.modes_dir, !cli.no_recurse);
    match cli.command {
        Commands::SyncGlobal(args) => args.run(&opts),
        Commands::SyncLocal(args) => args.run(&opts),
        Commands::List(args) => args.run(&opts),
        Commands::Validate(args) => args.run(&opts),
        Commands::Backup(args) => args.run(&opts),
        Commands::Restore(args) => args.run(&opts),
        Commands::ListBackups(args) => args.run(&opts),
    }
}
