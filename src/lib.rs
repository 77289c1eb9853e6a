pub mod cli;
pub mod coverage;
pub mod detail;
pub mod error;
pub mod ingest;
pub mod istanbul;
pub mod mapper;
pub mod model;
pub mod options;
pub mod resolve;
pub mod summary;
