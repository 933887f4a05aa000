use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use super::ReportMode;

/// What a `report` run produced, printed after the CSV is written.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: String,
    pub mode: ReportMode,
    pub files_analyzed: usize,
    pub blame_failures: usize,
    pub report_path: PathBuf,
    pub report_columns: usize,
    pub unmapped_users: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmapped_file: Option<PathBuf>,
}

fn separator(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Terminal rendering of `summary`.
pub fn render_summary(summary: &RunSummary) -> String {
    let root = if summary.root.is_empty() {
        "."
    } else {
        summary.root.as_str()
    };
    let report_path = summary.report_path.display().to_string();
    let width = report_path.len().max(root.len()).max(40) + 20;
    let separator = separator(width);

    let mut out = String::new();
    let _ = writeln!(out, "Ownership report by {}", summary.mode);
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, " {:<18}{}", "Root", root);
    let _ = writeln!(out, " {:<18}{}", "Files analyzed", summary.files_analyzed);
    let _ = writeln!(out, " {:<18}{}", "Blame failures", summary.blame_failures);
    let _ = writeln!(out, " {:<18}{}", "Report columns", summary.report_columns);
    let _ = writeln!(out, " {:<18}{}", "Report", report_path);
    let _ = writeln!(out, "{separator}");

    if summary.unmapped_users.is_empty() {
        return out;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Unmapped identifiers: {}", summary.unmapped_users.len());
    for user in &summary.unmapped_users {
        let _ = writeln!(out, "  {user}");
    }
    if let Some(path) = &summary.unmapped_file {
        let _ = writeln!(out, "Saved to {}", path.display());
    }
    out
}

pub fn print_summary(summary: &RunSummary) {
    print!("{}", render_summary(summary));
}

pub fn print_json(summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
