//! End-to-end `report` run: enumerate files, blame them in parallel,
//! write the CSV report and the unmapped-users file.

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::analyzer::Analyzer;
use crate::analyzer::store::EditorsStore;
use crate::config::Config;
use crate::error::OwnershipError;
use crate::git::GitBlameSource;
use crate::identity::{IdentityResolver, UserMapper};
use crate::report::summary::{self, RunSummary};
use crate::report::{ReportGenerator, ReportMode};
use crate::tree::walker::collect_paths;
use crate::tree::{FsNode, IgnoreList, TreeNode};

/// Command-line settings for a run. `None` means "take it from the config".
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub path: PathBuf,
    pub mode: Option<ReportMode>,
    pub mapping_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub unmapped_file: Option<PathBuf>,
    /// Added to the configured ignore names.
    pub ignore: Vec<String>,
    pub concurrency: Option<usize>,
    pub config_file: Option<PathBuf>,
}

impl ReportOptions {
    /// Overlay these options on `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.report = mode;
        }
        if let Some(path) = &self.mapping_file {
            config.mapping_file = Some(path.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = &self.unmapped_file {
            config.unmapped_file = Some(path.clone());
        }
        for name in &self.ignore {
            if !config.ignore.contains(name) {
                config.ignore.push(name.clone());
            }
        }
        if self.concurrency.is_some() {
            config.concurrency = self.concurrency;
        }
        config
    }
}

fn load_resolver(config: &Config) -> Result<Option<IdentityResolver>, OwnershipError> {
    match &config.mapping_file {
        Some(path) => IdentityResolver::from_file(path).map(Some),
        None if config.report == ReportMode::Team => Err(OwnershipError::Config(
            "team report requires a user mapping file (--mapping or mapping_file)".into(),
        )),
        None => Ok(None),
    }
}

/// Run the whole pipeline and return what it produced.
pub fn execute(options: &ReportOptions) -> Result<RunSummary, OwnershipError> {
    let root_path: &Path = &options.path;
    let config = options.apply(Config::load(options.config_file.as_deref(), root_path)?);
    let resolver = load_resolver(&config)?;

    let source = GitBlameSource::open(root_path)?;
    let base = source.relative_prefix(root_path)?;
    log::info!(
        "repository at {}, analysis root '{}'",
        source.root().display(),
        base
    );

    let root = FsNode::root(root_path)?;
    let files = if root.is_dir() {
        let ignore = IgnoreList::new(&config.ignore);
        collect_paths(Some(&root as &dyn TreeNode), &base, &ignore, true)
    } else {
        vec![base.clone()]
    };
    log::info!("found {} files", files.len());

    let store = EditorsStore::new();
    let mapper = resolver.as_ref().map(|r| r as &dyn UserMapper);
    let analyzer = Analyzer::new(&source, &store, mapper);
    analyzer.analyze_files(&files, config.effective_concurrency())?;
    if store.is_empty() {
        log::warn!("no files found under {}", root_path.display());
    }

    let generator = ReportGenerator::new(&config.output_dir, config.report);
    let report = generator.generate(&store, resolver.as_ref())?;

    let mut unmapped_users = Vec::new();
    let mut unmapped_file = None;
    if let Some(resolver) = &resolver {
        let path = config.unmapped_file_path();
        resolver.save_unmapped_users(&path)?;
        unmapped_users = resolver.unmapped_users();
        unmapped_file = Some(path);
    }

    Ok(RunSummary {
        root: base,
        mode: config.report,
        files_analyzed: store.len(),
        blame_failures: store.error_count(),
        report_path: report.path,
        report_columns: report.owner_columns,
        unmapped_users,
        unmapped_file,
    })
}

/// Run the pipeline and print the summary.
pub fn run(options: &ReportOptions, json: bool) -> Result<(), Box<dyn Error>> {
    let summary = execute(options)?;
    if json {
        summary::print_json(&summary)
    } else {
        summary::print_summary(&summary);
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
