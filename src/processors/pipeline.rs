use std::time::Instant;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, RunReport};
use crate::processors::{Cleaner, CleaningStats, Transformer};
use crate::readers::SourceReader;
use crate::storage::{LocalStore, ObjectStorage, StorageLocation};
use crate::utils::progress::ProgressReporter;
use crate::writers::SinkWriter;

/// Configuration and storage handle for one run, passed to every stage.
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub storage: ObjectStorage,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig) -> Self {
        let storage = ObjectStorage::new(LocalStore::with_mmap(config.reader.use_mmap));
        Self { config, storage }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the sink write.
    pub dry_run: bool,
}

/// Number of stages reported through [`ProgressReporter::stage`].
pub const PIPELINE_STAGES: usize = 3;

/// Source read, clean, transform, sink write.
pub struct Pipeline<'a> {
    context: &'a PipelineContext,
}

impl<'a> Pipeline<'a> {
    pub fn new(context: &'a PipelineContext) -> Self {
        Self { context }
    }

    pub async fn run(&self, options: RunOptions, progress: &ProgressReporter) -> Result<RunReport> {
        let started = Instant::now();
        let config = &self.context.config;

        // Parse both ends first so a bad sink fails before any work is done.
        let source = StorageLocation::parse(&config.source)?;
        let sink = StorageLocation::parse(&config.sink)?;
        let writer = SinkWriter::from_config(config)?;

        let mut report = RunReport::new(&source.to_string());

        progress.stage(1, &format!("Reading {}...", source));
        let reader = SourceReader::new(config.reader.clone());
        let (dataset, objects) = reader.read(&self.context.storage, &source).await?;
        report.objects_read = objects;
        report.records_read = dataset.len();
        info!(
            source = %source,
            objects,
            records = dataset.len(),
            fields = %dataset.schema().header_line(),
            "loaded source dataset"
        );

        progress.stage(2, "Cleaning and transforming records...");
        let stage_config = config.clone();
        let (dataset, stats) =
            tokio::task::spawn_blocking(move || process_dataset(&stage_config, dataset)).await??;
        report.apply_cleaning(&stats);
        report.output_fields = dataset.schema().fields().to_vec();

        if options.dry_run {
            info!(records = dataset.len(), "dry run, skipping write");
        } else {
            if dataset.is_empty() {
                warn!("no records survived cleaning, writing empty output");
            }
            progress.stage(3, &format!("Writing {}...", sink));
            let (target, written) = writer.write(&self.context.storage, &sink, dataset).await?;
            report.sink = Some(target.to_string());
            report.records_written = written;
        }

        report.elapsed_ms = started.elapsed().as_millis();
        progress.finish_with_message("Pipeline complete");
        Ok(report)
    }
}

/// Clean then transform `dataset` on a rayon pool sized by `max_workers`.
pub fn process_dataset(
    config: &PipelineConfig,
    dataset: Dataset,
) -> Result<(Dataset, CleaningStats)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_workers)
        .build()
        .map_err(|e| ProcessingError::Config(e.to_string()))?;

    let cleaner = Cleaner::new(config.cleaning.clone());
    let transformer = Transformer::new(config.transform.clone());

    pool.install(|| {
        let (dataset, stats) = cleaner.clean(dataset)?;
        let dataset = transformer.transform(dataset)?;
        Ok((dataset, stats))
    })
}
