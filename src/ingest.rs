use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CovError, Result};
use crate::istanbul::{self, ReportEntry};

/// File name Istanbul / NYC writes its JSON report under.
pub const REPORT_FILE_NAME: &str = "coverage-final.json";

/// Read and parse `coverage-final.json` from a run's coverage directory.
///
/// A missing or unreadable file is `CovError::ReportUnavailable`; invalid
/// JSON comes back as the underlying `serde_json::Error`.
pub async fn load_report(dir: &Path) -> Result<Vec<ReportEntry>> {
    let path = dir.join(REPORT_FILE_NAME);
    let content =
        tokio::fs::read(&path)
            .await
            .map_err(|source| CovError::ReportUnavailable {
                dir: dir.to_path_buf(),
                source,
            })?;

    let entries = istanbul::parse(&content)?;
    debug!(path = %path.display(), files = entries.len(), "Loaded coverage report");
    Ok(entries)
}

/// Remove a report directory. Best effort: failures are logged and
/// otherwise ignored.
pub async fn remove_report_dir(dir: PathBuf) {
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => debug!(dir = %dir.display(), "Removed coverage data"),
        Err(e) => debug!(dir = %dir.display(), error = %e, "Could not remove coverage data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_report_names_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_report(dir.path()).await.unwrap_err();
        match &err {
            CovError::ReportUnavailable { dir: reported, .. } => {
                assert_eq!(reported, dir.path());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[tokio::test]
    async fn test_malformed_report_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPORT_FILE_NAME), b"{ not json").unwrap();

        let err = load_report(dir.path()).await.unwrap_err();
        let CovError::MalformedReport(json) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(json.is_syntax());
        assert_eq!(err.to_string(), json.to_string());
    }

    #[tokio::test]
    async fn test_remove_missing_dir_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never-created");
        remove_report_dir(gone.clone()).await;
        assert!(!gone.exists());
    }
}
