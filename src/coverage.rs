//! Per-file coverage objects and the glue that registers them with a run.

use std::path::Path;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::{debug, info};

use crate::detail::extract_details;
use crate::error::Result;
use crate::ingest::{load_report, remove_report_dir};
use crate::istanbul::{RawFileCoverage, ReportEntry};
use crate::mapper::LocationMapper;
use crate::model::{CountMode, DetailRecord, SummaryCount};
use crate::options::{Options, OptionsOverride};
use crate::summary::summarize;

/// Work a run performs once when it is disposed. The host decides whether
/// to await the returned future or let it run detached.
pub type DisposeHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// The host's test run that coverage is reported to.
pub trait CoverageRun {
    fn add_coverage(&mut self, file: Arc<CoverageFile>);

    fn on_dispose(&mut self, hook: DisposeHook);
}

/// Coverage for one file of the report.
///
/// Summaries are computed on construction. Detail records are resolved on
/// every call to [`CoverageFile::details`] and never cached.
pub struct CoverageFile {
    reported_uri: String,
    compiled_uri: String,
    raw: RawFileCoverage,
    statements: SummaryCount,
    branches: SummaryCount,
    functions: SummaryCount,
    map_location: Arc<dyn LocationMapper>,
    count_mode: CountMode,
}

impl CoverageFile {
    pub fn new(
        reported_uri: impl Into<String>,
        compiled_uri: impl Into<String>,
        raw: RawFileCoverage,
        options: &Options,
    ) -> Self {
        Self {
            reported_uri: reported_uri.into(),
            compiled_uri: compiled_uri.into(),
            statements: summarize(raw.s.values()),
            branches: summarize(raw.b.values()),
            functions: summarize(raw.f.values()),
            raw,
            map_location: options.map_location.clone(),
            count_mode: options.count_mode,
        }
    }

    /// The uri coverage is shown under, after file uri mapping.
    pub fn reported_uri(&self) -> &str {
        &self.reported_uri
    }

    /// The uri of the file the report's coordinates refer to.
    pub fn compiled_uri(&self) -> &str {
        &self.compiled_uri
    }

    pub fn raw(&self) -> &RawFileCoverage {
        &self.raw
    }

    pub fn statement_coverage(&self) -> SummaryCount {
        self.statements
    }

    pub fn branch_coverage(&self) -> SummaryCount {
        self.branches
    }

    pub fn function_coverage(&self) -> SummaryCount {
        self.functions
    }

    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    /// Resolve detail records through the file's location mapper.
    pub async fn details(&self) -> Vec<DetailRecord> {
        extract_details(
            &self.raw,
            &self.compiled_uri,
            self.map_location.as_ref(),
            self.count_mode,
        )
        .await
    }
}

impl std::fmt::Debug for CoverageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageFile")
            .field("reported_uri", &self.reported_uri)
            .field("compiled_uri", &self.compiled_uri)
            .field("statements", &self.statements)
            .field("branches", &self.branches)
            .field("functions", &self.functions)
            .field("count_mode", &self.count_mode)
            .finish_non_exhaustive()
    }
}

/// Applies Istanbul reports to runs with a fixed set of base options.
#[derive(Debug, Clone, Default)]
pub struct CoverageContext {
    options: Options,
}

impl CoverageContext {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Load the report in `coverage_dir`, register one `CoverageFile` per
    /// entry with `run`, and return how many were registered.
    ///
    /// When directory removal is enabled, the hook is attached before the
    /// report is read, so the directory is cleaned up even if loading fails.
    pub async fn apply(
        &self,
        run: &mut dyn CoverageRun,
        coverage_dir: &Path,
        overrides: &OptionsOverride,
    ) -> Result<usize> {
        let options = self.options.merge(overrides);

        if options.remove_data_at_end_of_run {
            let dir = coverage_dir.to_path_buf();
            run.on_dispose(Box::new(move || remove_report_dir(dir).boxed()));
        }

        let entries = load_report(coverage_dir).await?;
        let files = build_files(entries, &options).await;

        let count = files.len();
        for file in files {
            run.add_coverage(Arc::new(file));
        }
        info!(dir = %coverage_dir.display(), files = count, "Applied coverage report");
        Ok(count)
    }

    /// Answer the host's request for a file's detail records.
    pub async fn request_detail(&self, file: &CoverageFile) -> Vec<DetailRecord> {
        file.details().await
    }
}

/// Build coverage files for every entry whose uri maps. File uris are
/// mapped concurrently; report order is kept.
pub async fn build_files(entries: Vec<ReportEntry>, options: &Options) -> Vec<CoverageFile> {
    let mapper = options.map_file_uri.as_ref();
    let reported = join_all(entries.iter().map(|entry| mapper.map(entry.path()))).await;

    entries
        .into_iter()
        .zip(reported)
        .filter_map(|(entry, reported_uri)| {
            let compiled_uri = entry.path().to_string();
            match reported_uri {
                Some(uri) => Some(CoverageFile::new(uri, compiled_uri, entry.coverage, options)),
                None => {
                    debug!(uri = %compiled_uri, "Skipping file without a mapped uri");
                    None
                }
            }
        })
        .collect()
}
