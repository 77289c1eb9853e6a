use std::path::PathBuf;

use tempfile::TempDir;

pub const SAMPLE: &[u8] = include_bytes!("../fixtures/sample_istanbul.json");

/// Create a run-scoped coverage directory holding `report` as
/// coverage-final.json. The caller must hold onto `TempDir` to keep the
/// parent directory alive.
pub fn report_dir(report: &[u8]) -> (TempDir, PathBuf) {
    let parent = tempfile::tempdir().unwrap();
    let dir = parent.path().join("coverage-run");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join(covremap::ingest::REPORT_FILE_NAME), report).unwrap();
    (parent, dir)
}
