pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use tracing::info;

use crate::config::{OutputFormat, PipelineConfig};
use crate::error::Result;
use crate::models::Dataset;
use crate::storage::{ObjectStorage, StorageLocation};

/// Encodes the final dataset and stores it at the sink location.
pub struct SinkWriter {
    format: OutputFormat,
    write_header: bool,
    delimiter: u8,
    compression: String,
}

impl SinkWriter {
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            format: config.format,
            write_header: config.writer.write_header,
            delimiter: config.writer.delimiter_byte()?,
            compression: config.writer.compression.clone(),
        })
    }

    pub fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Csv => CsvWriter::new()
                .with_header(self.write_header)
                .with_delimiter(self.delimiter)
                .encode(dataset),
            OutputFormat::Parquet => ParquetWriter::new()
                .with_compression(&self.compression)?
                .encode(dataset),
        }
    }

    /// Consume the dataset and persist it. Returns the object written and the
    /// number of records in it.
    pub async fn write(
        &self,
        storage: &ObjectStorage,
        location: &StorageLocation,
        dataset: Dataset,
    ) -> Result<(StorageLocation, usize)> {
        let target = location.output_object(self.format.extension());
        let records = dataset.len();

        let encoder = self.clone_settings();
        let bytes = tokio::task::spawn_blocking(move || encoder.encode(&dataset)).await??;

        info!(
            target = %target,
            records,
            bytes = bytes.len(),
            format = self.format.extension(),
            "writing output"
        );
        storage.write(&target, bytes).await?;
        Ok((target, records))
    }

    fn clone_settings(&self) -> Self {
        Self {
            format: self.format,
            write_header: self.write_header,
            delimiter: self.delimiter,
            compression: self.compression.clone(),
        }
    }
}
