//! Ownership report: one row per file, one column per person or team.
//!
//! Columns are discovered from the stored line counts in first-seen
//! order (files in path order, authors in name order). Authors without a
//! mapping, and in team mode authors without a team, share one trailing
//! `Unmapped` column. Cells hold the column's share of the file's lines
//! as a two-decimal percentage; columns that did not contribute stay blank.

pub mod summary;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analyzer::store::{EditorsStore, FileEditors};
use crate::csv_io;
use crate::error::OwnershipError;
use crate::identity::IdentityResolver;

pub const FILE_PATH_HEADER: &str = "File Path";
pub const UNMAPPED_COLUMN: &str = "Unmapped";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// One column per person.
    #[default]
    User,
    /// One column per team.
    Team,
}

impl ReportMode {
    pub fn slug(&self) -> &'static str {
        match self {
            ReportMode::User => "user",
            ReportMode::Team => "team",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportMode {
    type Err = OwnershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ReportMode::User),
            "team" => Ok(ReportMode::Team),
            other => Err(OwnershipError::Config(format!(
                "unknown report type: {other} (possible values: user, team)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Number of owner columns, `Unmapped` included.
    pub fn owner_columns(&self) -> usize {
        self.header.len() - 1
    }

    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        csv_io::write_record(out, &self.header)?;
        for row in &self.rows {
            csv_io::write_record(out, row)?;
        }
        Ok(())
    }
}

enum Bucket {
    Owner(String),
    Unmapped,
}

fn bucket_for(name: &str, resolver: Option<&IdentityResolver>, mode: ReportMode) -> Bucket {
    let owner = resolver.map(|r| r.user_by_display_name(name));
    match (mode, owner) {
        (ReportMode::User, None) => Bucket::Owner(name.to_string()),
        (ReportMode::User, Some(Some(info))) => Bucket::Owner(info.display_name.clone()),
        (ReportMode::Team, Some(Some(info))) if info.has_team() => {
            Bucket::Owner(info.team.clone())
        }
        _ => Bucket::Unmapped,
    }
}

/// Build the report table from stored per-file line counts.
///
/// Author keys are names as produced by the analyzer: display names for
/// mapped authors, raw identifiers otherwise. They are matched against
/// the resolver's display names and never resolved a second time.
/// Team mode needs a resolver and fails with a configuration error
/// otherwise. Files without line counts (blame failures) or with zero
/// attributed lines get a row of blank cells.
pub fn build_table(
    files: &BTreeMap<String, FileEditors>,
    resolver: Option<&IdentityResolver>,
    mode: ReportMode,
) -> Result<ReportTable, OwnershipError> {
    if mode == ReportMode::Team && resolver.is_none() {
        return Err(OwnershipError::Config(
            "user mapping is required for team report".into(),
        ));
    }

    // First pass: discover columns.
    let mut owners: Vec<String> = Vec::new();
    let mut column_of: HashMap<String, usize> = HashMap::new();
    let mut has_unmapped = false;
    for editors in files.values().filter_map(|f| f.editors.as_ref()) {
        for name in editors.keys() {
            match bucket_for(name, resolver, mode) {
                Bucket::Owner(name) => {
                    if !column_of.contains_key(&name) {
                        column_of.insert(name.clone(), owners.len());
                        owners.push(name);
                    }
                }
                Bucket::Unmapped => has_unmapped = true,
            }
        }
    }
    let unmapped_col = owners.len();

    let mut header = Vec::with_capacity(owners.len() + 2);
    header.push(FILE_PATH_HEADER.to_string());
    header.extend(owners);
    if has_unmapped {
        header.push(UNMAPPED_COLUMN.to_string());
    }

    // Second pass: one row per file.
    let mut rows = Vec::with_capacity(files.len());
    for (path, entry) in files {
        let mut row = vec![String::new(); header.len()];
        row[0] = path.clone();

        if let Some(editors) = &entry.editors {
            let total: usize = editors.values().sum();
            if total > 0 {
                let mut numerators = vec![0usize; header.len() - 1];
                for (name, lines) in editors {
                    let col = match bucket_for(name, resolver, mode) {
                        Bucket::Owner(name) => column_of[&name],
                        Bucket::Unmapped => unmapped_col,
                    };
                    numerators[col] += lines;
                }
                for (i, cell) in percentages(&numerators, total).into_iter().enumerate() {
                    if let Some(cell) = cell {
                        row[i + 1] = cell;
                    }
                }
            }
        }
        rows.push(row);
    }

    Ok(ReportTable { header, rows })
}

/// Two-decimal shares of `total` for every non-zero numerator.
///
/// Uses largest-remainder rounding on hundredths: each share is within
/// 0.01 of exact and the shares sum to exactly 100.00. `numerators` must
/// sum to `total`, and `total` must be positive.
pub fn percentages(numerators: &[usize], total: usize) -> Vec<Option<String>> {
    const SCALE: u128 = 10_000;
    let total = total as u128;
    let remainder = |n: usize| (n as u128 * SCALE) % total;

    let mut hundredths: Vec<u128> = numerators
        .iter()
        .map(|&n| n as u128 * SCALE / total)
        .collect();
    let mut leftover = SCALE.saturating_sub(hundredths.iter().sum());

    let mut order: Vec<usize> = (0..numerators.len())
        .filter(|&i| numerators[i] > 0)
        .collect();
    order.sort_by(|&a, &b| {
        remainder(numerators[b])
            .cmp(&remainder(numerators[a]))
            .then(a.cmp(&b))
    });
    for i in order {
        if leftover == 0 {
            break;
        }
        hundredths[i] += 1;
        leftover -= 1;
    }

    numerators
        .iter()
        .zip(hundredths)
        .map(|(&n, h)| (n > 0).then(|| format!("{}.{:02}", h / 100, h % 100)))
        .collect()
}

/// A report written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub rows: usize,
    pub owner_columns: usize,
}

/// Writes report tables as timestamped CSV files into a directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    mode: ReportMode,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, mode: ReportMode) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode,
        }
    }

    /// File name for a report generated at `timestamp`.
    pub fn file_name(&self, timestamp: &chrono::DateTime<chrono::Local>) -> String {
        format!(
            "file_changes_report_by_{}_{}.csv",
            self.mode.slug(),
            timestamp.format("%Y-%m-%d_%H-%M-%S")
        )
    }

    /// Build the table from `store` and write it as CSV.
    pub fn generate(
        &self,
        store: &EditorsStore,
        resolver: Option<&IdentityResolver>,
    ) -> Result<GeneratedReport, OwnershipError> {
        let files: BTreeMap<String, FileEditors> = store
            .all_files()
            .into_iter()
            .filter_map(|path| store.file_editors(&path).map(|entry| (path, entry)))
            .collect();
        let table = build_table(&files, resolver, self.mode)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            OwnershipError::Config(format!(
                "failed to create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;
        let path = self.output_dir.join(self.file_name(&chrono::Local::now()));

        let mut out = BufWriter::new(File::create(&path)?);
        table.write_csv(&mut out)?;
        out.flush()?;

        log::info!(
            "wrote {} report with {} rows to {}",
            self.mode,
            table.rows.len(),
            path.display()
        );
        Ok(GeneratedReport {
            path,
            rows: table.rows.len(),
            owner_columns: table.owner_columns(),
        })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
