//! Console and file reporting

use std::path::{Path, PathBuf};
use colored::{Color, Colorize};
use serde::Serialize;
use tracing::info;

use crate::classify::{Status, Verdict};
use crate::config::Should;
use crate::discovery::Discovery;
use crate::error::HarnessResult;
use crate::runner::Summary;

/// Display color for a verdict
pub const fn status_color(status: Status) -> Color {
    match status {
        Status::Pass => Color::BrightGreen,
        Status::Warn => Color::BrightYellow,
        Status::Fail => Color::BrightRed,
    }
}

fn paint(status: Status) -> String {
    status.label().color(status_color(status)).to_string()
}

/// Per-pattern and total match counts
pub fn discovery_lines(discovery: &Discovery, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for m in &discovery.patterns {
        lines.push(format!("Found {} tests in '{}'", m.count, m.pattern));
        if verbose {
            lines.push(format!("  with glob-pattern '{}'", m.glob));
        }
    }
    lines.push(format!("Found {} tests in total.", discovery.total()));
    lines
}

/// Status line followed by the messages of one verdict
pub fn verdict_lines(verdict: &Verdict, should: Option<Should>) -> Vec<String> {
    let mut lines = Vec::new();
    let status = paint(verdict.status);

    match should {
        None => lines.push(format!("{}: {}", status, verdict.test.display())),
        Some(should) => lines.push(format!(
            "{} (should {}): {}",
            status,
            should,
            verdict.test.display()
        )),
    }

    for line in &verdict.findings.errors {
        lines.push(format!("- Error: {}", line));
    }
    for line in &verdict.findings.warnings {
        lines.push(format!("- Warning: {}", line));
    }
    for line in &verdict.findings.info {
        lines.push(format!("- Info: {}", line));
    }
    if verdict.status != Status::Pass {
        lines.push(format!("- Log: {}", verdict.log_file.display()));
    }

    lines
}

/// Totals block and the overall conclusion
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "Summary:".to_string(),
        format!("- PASS: {}", summary.passed),
        format!("- FAIL: {}", summary.failed),
        format!("- WARN: {}", summary.warned),
    ];
    if let Some(should) = summary.should {
        lines.push(format!("(should {})", should));
    }
    let conclusion = if summary.success() { Status::Pass } else { Status::Fail };
    lines.push(paint(conclusion));
    lines
}

pub fn print_discovery(discovery: &Discovery, verbose: bool) {
    for line in discovery_lines(discovery, verbose) {
        println!("{}", line);
    }
}

pub fn print_verdict(verdict: &Verdict, should: Option<Should>) {
    for line in verdict_lines(verdict, should) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &Summary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct ResultsFile<'a> {
    success: bool,
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Write the finished summary as pretty JSON
pub fn write_results(summary: &Summary, path: &Path) -> HarnessResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&ResultsFile {
        success: summary.success(),
        summary,
    })?;
    std::fs::write(path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path.to_path_buf())
}
