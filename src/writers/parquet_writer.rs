use crate::error::{ProcessingError, Result};
use crate::models::value::NULL;
use crate::models::{Dataset, Record, Value};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_CHUNK_SIZE, DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Arrow type chosen for a column from the values it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    fn data_type(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Text => DataType::Utf8,
        }
    }
}

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Encode a dataset as a Parquet file held in memory.
    pub fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let kinds = column_kinds(dataset);
        let schema = self.create_schema(dataset, &kinds);

        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(Vec::new(), schema.clone(), Some(props))?;

        // Write in batches
        for chunk in dataset.records().chunks(self.batch_size) {
            let batch = self.records_to_batch(chunk, &kinds, schema.clone())?;
            writer.write(&batch)?;
        }

        Ok(writer.into_inner()?)
    }

    /// Arrow schema with one nullable column per dataset field
    fn create_schema(&self, dataset: &Dataset, kinds: &[ColumnKind]) -> Arc<Schema> {
        let fields: Vec<Field> = dataset
            .schema()
            .fields()
            .iter()
            .zip(kinds)
            .map(|(name, kind)| Field::new(name, kind.data_type(), true))
            .collect();

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(
        &self,
        records: &[Record],
        kinds: &[ColumnKind],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let values = records.iter().map(|r| r.get(index).unwrap_or(&NULL));
                let array: ArrayRef = match kind {
                    ColumnKind::Integer => Arc::new(Int64Array::from(
                        values
                            .map(|v| match v.canonical() {
                                Value::Integer(i) => Some(*i),
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                    )),
                    ColumnKind::Float => Arc::new(Float64Array::from(
                        values.map(Value::as_f64).collect::<Vec<_>>(),
                    )),
                    ColumnKind::Text => Arc::new(StringArray::from(
                        values
                            .map(|v| (!v.is_null()).then(|| v.to_string()))
                            .collect::<Vec<_>>(),
                    )),
                };
                array
            })
            .collect();

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();
        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            columns,
            file_size,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// All-integer columns stay Int64, other all-numeric columns become Float64,
/// anything else (including all-null) is written as text.
fn column_kinds(dataset: &Dataset) -> Vec<ColumnKind> {
    (0..dataset.schema().len())
        .map(|index| {
            let mut kind = None;
            for value in dataset.records().iter().filter_map(|r| r.get(index)) {
                kind = match (kind, value.canonical()) {
                    (_, Value::Null) => kind,
                    (_, Value::Text(_)) => return ColumnKind::Text,
                    (None | Some(ColumnKind::Integer), Value::Integer(_)) => {
                        Some(ColumnKind::Integer)
                    }
                    _ => Some(ColumnKind::Float),
                };
            }
            kind.unwrap_or(ColumnKind::Text)
        })
        .collect()
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub columns: Vec<String>,
    pub file_size: u64,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - Columns: {}\n\
            - File size: {:.2} MB",
            self.total_rows,
            self.row_groups,
            self.columns.join(", "),
            self.file_size as f64 / 1_048_576.0, // Convert to MB
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample() -> Dataset {
        Dataset::from_rows(
            ["Temp_Celsius", "Humidity_Percent", "Temp_Fahrenheit", "Station"],
            vec![
                vec![
                    Value::Integer(20),
                    Value::Integer(50),
                    Value::Float(68.0),
                    "Leeds".into(),
                ],
                vec![
                    Value::Float(21.5),
                    Value::Integer(51),
                    Value::Float(70.7),
                    "York".into(),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_kinds() {
        assert_eq!(
            column_kinds(&sample()),
            vec![
                ColumnKind::Float,
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Text
            ]
        );

        let all_null = Dataset::from_rows(["Empty"], vec![vec![Value::Null]]).unwrap();
        assert_eq!(column_kinds(&all_null), vec![ColumnKind::Text]);

        let markers = vec![String::new()];
        let spelled = Dataset::from_rows(
            ["Station", "Reading"],
            vec![
                vec![Value::parse("007", &markers), Value::parse("1.50", &markers)],
                vec![Value::parse("12", &markers), Value::parse("2", &markers)],
            ],
        )
        .unwrap();
        assert_eq!(
            column_kinds(&spelled),
            vec![ColumnKind::Integer, ColumnKind::Float]
        );
    }

    #[test]
    fn test_invalid_compression() {
        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());
        assert!(ParquetWriter::new().with_compression("ZSTD").is_ok());
    }

    #[test]
    fn test_encode_and_read_back_metadata() -> Result<()> {
        let writer = ParquetWriter::new().with_batch_size(1);
        let bytes = writer.encode(&sample())?;

        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), &bytes)?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert_eq!(
            info.columns,
            vec!["Temp_Celsius", "Humidity_Percent", "Temp_Fahrenheit", "Station"]
        );
        assert!(info.summary().contains("Total rows: 2"));
        Ok(())
    }

    #[test]
    fn test_encode_empty_dataset_keeps_schema() -> Result<()> {
        let dataset = Dataset::from_rows(["Temp_Celsius"], vec![])?;
        let writer = ParquetWriter::new().with_compression("none")?;
        let bytes = writer.encode(&dataset)?;

        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), &bytes)?;
        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 0);
        assert_eq!(info.columns, vec!["Temp_Celsius"]);
        Ok(())
    }
}
