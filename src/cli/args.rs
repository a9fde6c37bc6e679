use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "weather-etl")]
#[command(about = "Clean, rename and convert weather CSV data held in object storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Pipeline configuration file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read, clean, transform and write the dataset
    Run {
        #[arg(short, long, help = "Source location (s3://bucket/prefix/ or local path)")]
        source: Option<String>,

        #[arg(short = 'o', long, help = "Sink location (s3://bucket/prefix/ or local path)")]
        sink: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long, default_value = "false", help = "Run every stage except the write")]
        dry_run: bool,

        #[arg(long, default_value = "false", help = "Print the run report as JSON")]
        json: bool,
    },

    /// Run the cleaning and transform stages without writing output
    Validate {
        #[arg(short, long, help = "Source location (s3://bucket/prefix/ or local path)")]
        source: Option<String>,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long, default_value = "false", help = "Print the run report as JSON")]
        json: bool,
    },

    /// Show the schema and a sample of a CSV location, or the metadata of a local Parquet file
    Inspect {
        #[arg(short, long)]
        location: String,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "weather-etl",
            "run",
            "--source",
            "data/raw/",
            "-o",
            "data/out/",
            "--format",
            "parquet",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                source,
                sink,
                format,
                dry_run,
                json,
                ..
            } => {
                assert_eq!(source.as_deref(), Some("data/raw/"));
                assert_eq!(sink.as_deref(), Some("data/out/"));
                assert_eq!(format, Some(OutputFormat::Parquet));
                assert!(dry_run);
                assert!(!json);
            }
            _ => panic!("expected run command"),
        }
    }
}
