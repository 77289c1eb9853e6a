use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovError {
    #[error("Coverage report not available in {}: {source}", .dir.display())]
    ReportUnavailable {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    MalformedReport(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CovError>;
