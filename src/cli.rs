/// CLI argument definitions for the `om` command.
///
/// Defines the subcommands, their arguments, and long help text
/// using the `clap` derive macros.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::ReportOptions;
use crate::report::ReportMode;

/// Top-level CLI parser with a single subcommand selector.
#[derive(Parser)]
#[command(name = "om", version, about = "Code ownership reports from git blame")]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report granularity as accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum ReportBy {
    User,
    Team,
}

impl From<ReportBy> for ReportMode {
    fn from(by: ReportBy) -> Self {
        match by {
            ReportBy::User => ReportMode::User,
            ReportBy::Team => ReportMode::Team,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a per-file ownership report as CSV
    #[command(long_about = "\
Write a per-file ownership report as CSV.

Every file under PATH is blamed at HEAD and its lines are attributed to
their authors. Each report row holds, per person (--by user) or per team
(--by team), the share of the file's lines as a percentage with two
decimals. Authors missing from the alias table share an 'Unmapped' column
and are appended to the unmapped-users file.

Alias table format (CSV, no header):
  display name, team, alias, alias, ...

Settings are read from --config, else PATH/.ownmap.toml, and flags
override them.

Examples:
  om report                              # current directory, by user
  om report src/ --mapping people.csv    # merge aliases into people
  om report --by team --mapping people.csv
  om report --ignore target --ignore node_modules
  om report --json                       # machine-readable summary")]
    Report(ReportArgs),

    /// Print shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `om report`.
#[derive(Args)]
pub struct ReportArgs {
    /// Directory inside a git working copy (default: current directory)
    pub path: Option<PathBuf>,

    /// Report granularity (default: user)
    #[arg(long, value_enum)]
    pub by: Option<ReportBy>,

    /// Alias table CSV (required for --by team)
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Directory for the CSV report (default: reports)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Unmapped-users CSV (default: <output-dir>/unmapped_users.csv)
    #[arg(long)]
    pub unmapped_file: Option<PathBuf>,

    /// Entry name to skip at every level, repeatable (.git is skipped by default)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Number of blame workers (default: available CPUs)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            path: self.path.clone().unwrap_or_else(|| PathBuf::from(".")),
            mode: self.by.map(ReportMode::from),
            mapping_file: self.mapping.clone(),
            output_dir: self.output_dir.clone(),
            unmapped_file: self.unmapped_file.clone(),
            ignore: self.ignore.clone(),
            concurrency: self.concurrency,
            config_file: self.config.clone(),
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
