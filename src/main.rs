use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covremap::cli;
use covremap::coverage::CoverageContext;
use covremap::mapper::PrefixMapper;
use covremap::options::OptionsOverride;

/// covremap — Istanbul coverage summaries and remapped coverage details.
#[derive(Parser)]
#[command(name = "covremap", version, about)]
struct Cli {
    /// Report hits as covered / not covered instead of execution counts.
    #[arg(long, global = true)]
    boolean_counts: bool,

    /// Keep the coverage directory instead of deleting it once the command
    /// finishes.
    #[arg(long, global = true)]
    keep_data: bool,

    /// Rewrite a path prefix of file uris and locations, as FROM=TO.
    #[arg(long, global = true, value_parser = parse_prefix)]
    map_prefix: Option<PrefixMapper>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statement, branch and function summaries per file.
    Summary {
        /// Directory containing coverage-final.json.
        dir: PathBuf,
    },

    /// Show resolved coverage details (0-based positions) for one file.
    Details {
        /// Directory containing coverage-final.json.
        dir: PathBuf,

        /// The file, by reported or compiled path.
        source_file: String,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_prefix(s: &str) -> std::result::Result<PrefixMapper, String> {
    PrefixMapper::parse(s).ok_or_else(|| format!("expected FROM=TO, got '{s}'"))
}

/// Per-call overrides from the global flags. Data removal is only
/// overridden by `--keep-data`.
fn overrides(cli: &Cli) -> OptionsOverride {
    let mut overrides = OptionsOverride::new().boolean_counts(cli.boolean_counts);
    if cli.keep_data {
        overrides = overrides.remove_data_at_end_of_run(false);
    }
    if let Some(prefix) = &cli.map_prefix {
        let prefix = Arc::new(prefix.clone());
        overrides = overrides
            .map_file_uri(prefix.clone())
            .map_location(prefix);
    }
    overrides
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let overrides = overrides(&cli);
    let context = CoverageContext::default();
    let output = match cli.command {
        Commands::Summary { dir } => cli::cmd_summary(&context, &dir, &overrides).await?,
        Commands::Details {
            dir,
            source_file,
            json,
        } => cli::cmd_details(&context, &dir, &source_file, json, &overrides).await?,
    };
    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covremap::options::Options;

    #[test]
    fn test_data_removed_by_default() {
        let cli = Cli::try_parse_from(["covremap", "summary", "coverage"]).unwrap();
        let options = Options::default().merge(&overrides(&cli));
        assert!(options.remove_data_at_end_of_run);
        assert!(!options.boolean_counts());
    }

    #[test]
    fn test_keep_data_flag() {
        let cli = Cli::try_parse_from([
            "covremap",
            "details",
            "coverage",
            "/src/app.js",
            "--keep-data",
            "--boolean-counts",
        ])
        .unwrap();
        let options = Options::default().merge(&overrides(&cli));
        assert!(!options.remove_data_at_end_of_run);
        assert!(options.boolean_counts());
    }
}
