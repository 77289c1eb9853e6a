//! Command handler functions for the covremap CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::coverage::{CoverageContext, CoverageFile, CoverageRun, DisposeHook};
use crate::model::{DetailRecord, SourceLocation, SummaryCount};
use crate::options::OptionsOverride;

/// A run that keeps registered files in memory and runs its dispose hooks
/// when `dispose` is awaited.
#[derive(Default)]
pub struct LocalRun {
    files: Vec<Arc<CoverageFile>>,
    hooks: Vec<DisposeHook>,
}

impl LocalRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[Arc<CoverageFile>] {
        &self.files
    }

    /// Find a file by its reported or compiled uri.
    pub fn find(&self, uri: &str) -> Option<&Arc<CoverageFile>> {
        self.files
            .iter()
            .find(|f| f.reported_uri() == uri || f.compiled_uri() == uri)
    }

    pub async fn dispose(self) {
        for hook in self.hooks {
            hook().await;
        }
    }
}

impl CoverageRun for LocalRun {
    fn add_coverage(&mut self, file: Arc<CoverageFile>) {
        self.files.push(file);
    }

    fn on_dispose(&mut self, hook: DisposeHook) {
        self.hooks.push(hook);
    }
}

fn format_summary(count: SummaryCount) -> String {
    if count.total == 0 {
        return "-".to_string();
    }
    format!(
        "{}/{} ({:.1}%)",
        count.covered,
        count.total,
        count.rate() * 100.0
    )
}

fn format_location(location: &SourceLocation) -> String {
    let range = location.range;
    format!(
        "{}:{}:{}-{}:{}",
        location.uri, range.start.line, range.start.column, range.end.line, range.end.column
    )
}

pub async fn cmd_summary(
    context: &CoverageContext,
    dir: &Path,
    overrides: &OptionsOverride,
) -> Result<String> {
    let mut run = LocalRun::new();
    context
        .apply(&mut run, dir, overrides)
        .await
        .with_context(|| format!("Failed to apply coverage from {}", dir.display()))?;

    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>18} {:>18} {:>18}",
        "FILE", "STATEMENTS", "BRANCHES", "FUNCTIONS"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(117)).unwrap();

    let mut totals = [SummaryCount::default(); 3];
    for f in run.files() {
        let counts = [
            f.statement_coverage(),
            f.branch_coverage(),
            f.function_coverage(),
        ];
        for (total, count) in totals.iter_mut().zip(counts) {
            total.covered += count.covered;
            total.total += count.total;
        }
        writeln!(
            out,
            "{:<60} {:>18} {:>18} {:>18}",
            f.reported_uri(),
            format_summary(counts[0]),
            format_summary(counts[1]),
            format_summary(counts[2]),
        )
        .unwrap();
    }

    writeln!(out, "{}", "-".repeat(117)).unwrap();
    writeln!(
        out,
        "{:<60} {:>18} {:>18} {:>18}",
        format!("TOTAL ({} files)", run.files().len()),
        format_summary(totals[0]),
        format_summary(totals[1]),
        format_summary(totals[2]),
    )
    .unwrap();

    run.dispose().await;
    Ok(out)
}

/// Print the resolved detail records of one file. Positions are 0-based.
pub async fn cmd_details(
    context: &CoverageContext,
    dir: &Path,
    source_file: &str,
    json: bool,
    overrides: &OptionsOverride,
) -> Result<String> {
    let mut run = LocalRun::new();
    context
        .apply(&mut run, dir, overrides)
        .await
        .with_context(|| format!("Failed to apply coverage from {}", dir.display()))?;

    let details = match run.find(source_file) {
        Some(file) => context.request_detail(file).await,
        None => {
            run.dispose().await;
            return Ok(format!("No coverage data for '{}'\n", source_file));
        }
    };
    run.dispose().await;

    if json {
        let mut out = serde_json::to_string_pretty(&details)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    writeln!(out, "{:<10} {:<50} {:>10}  NAME", "KIND", "LOCATION", "HITS").unwrap();
    writeln!(out, "{}", "-".repeat(80)).unwrap();
    for record in &details {
        let marker = if record.hits().is_covered() { "✓" } else { "✗" };
        match record {
            DetailRecord::Statement(s) => {
                let kind = if s.branches.is_empty() { "statement" } else { "branch" };
                writeln!(
                    out,
                    "{:<10} {:<50} {:>10}  {}",
                    kind,
                    format_location(&s.location),
                    s.hits,
                    marker
                )
                .unwrap();
                for b in &s.branches {
                    let label = b.label.map(|l| l.as_str()).unwrap_or("");
                    let marker = if b.hits.is_covered() { "✓" } else { "✗" };
                    writeln!(
                        out,
                        "  {:<8} {:<50} {:>10}  {} {}",
                        "arm",
                        format_location(&b.location),
                        b.hits,
                        marker,
                        label
                    )
                    .unwrap();
                }
            }
            DetailRecord::Function(f) => {
                writeln!(
                    out,
                    "{:<10} {:<50} {:>10}  {} {}",
                    "function",
                    format_location(&f.location),
                    f.hits,
                    marker,
                    f.name
                )
                .unwrap();
            }
        }
    }
    Ok(out)
}
