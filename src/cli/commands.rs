use tracing::info;

use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::RunReport;
use crate::processors::pipeline::PIPELINE_STAGES;
use crate::processors::{Pipeline, PipelineContext, RunOptions};
use crate::readers::SourceReader;
use crate::storage::StorageLocation;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;

pub async fn run(cli: Cli) -> Result<()> {
    let base = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            source,
            sink,
            format,
            max_workers,
            dry_run,
            json,
        } => {
            let config = base
                .with_source(source)
                .with_sink(sink)
                .with_format(format)
                .with_max_workers(max_workers);
            config.check()?;

            info!(
                source = %config.source,
                sink = %config.sink,
                format = config.format.extension(),
                workers = config.max_workers,
                "starting pipeline run"
            );

            let report = execute(config, RunOptions { dry_run }, json).await?;
            print_report(&report, json)?;
        }

        Commands::Validate {
            source,
            max_workers,
            json,
        } => {
            let config = base.with_source(source).with_max_workers(max_workers);
            config.check()?;

            let report = execute(config, RunOptions { dry_run: true }, json).await?;
            print_report(&report, json)?;

            if !json {
                if report.after_null_drop == 0 {
                    println!("⚠️  No records survived cleaning");
                } else {
                    println!("✅ All stages completed without errors");
                }
            }
        }

        Commands::Inspect { location, sample } => {
            inspect(base, &location, sample).await?;
        }
    }

    Ok(())
}

async fn execute(config: PipelineConfig, options: RunOptions, quiet: bool) -> Result<RunReport> {
    let context = PipelineContext::new(config);
    let progress = ProgressReporter::for_stages("Starting pipeline...", PIPELINE_STAGES, quiet);
    Pipeline::new(&context).run(options, &progress).await
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report)
            .map_err(|e| ProcessingError::InvalidFormat(e.to_string()))?;
        println!("{}", rendered);
    } else {
        println!("\n{}", report.summary());
    }
    Ok(())
}

async fn inspect(config: PipelineConfig, location: &str, sample: usize) -> Result<()> {
    let parsed = StorageLocation::parse(location)?;

    if let StorageLocation::Local(path) = &parsed {
        if path.extension().is_some_and(|ext| ext == "parquet") {
            let info = ParquetWriter::new().get_file_info(path)?;
            println!("{}", info.summary());
            return Ok(());
        }
    }

    println!("Inspecting: {}", parsed);
    let context = PipelineContext::new(config);
    let reader = SourceReader::new(context.config.reader.clone());
    let (dataset, objects) = reader.read(&context.storage, &parsed).await?;

    println!("Objects: {}", objects);
    println!("Records: {}", dataset.len());
    println!("Fields: {}", dataset.schema().header_line());

    if sample > 0 {
        println!("\nSample Records (showing up to {} records):", sample);
        let schema = dataset.schema();
        for (i, record) in dataset.records().iter().take(sample).enumerate() {
            let cells: Vec<String> = schema
                .fields()
                .iter()
                .zip(record.values())
                .map(|(field, value)| format!("{}={}", field, value))
                .collect();
            println!("{}. {}", i + 1, cells.join(", "));
        }
    }

    Ok(())
}
