use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::Value;
use crate::utils::constants::{
    CELSIUS_FIELD, DEFAULT_COMPRESSION, DEFAULT_SINK, DEFAULT_SOURCE, ENV_PREFIX,
    FAHRENHEIT_FIELD, HUMIDITY_FIELD, HUMIDITY_PCT_FIELD, HUMIDITY_PERCENT_FIELD,
    TEMPERATURE_C_FIELD, TEMPERATURE_FIELD,
};

/// Output encoding for the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReaderConfig {
    pub with_header: bool,

    #[validate(length(equal = 1))]
    pub delimiter: String,

    /// Cell spellings read as missing.
    pub null_values: Vec<String>,

    /// Memory-map local files instead of buffered reads.
    pub use_mmap: bool,
}

fn delimiter_byte(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(ProcessingError::Config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            delimiter
        ))),
    }
}

impl ReaderConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.delimiter)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            with_header: true,
            delimiter: ",".to_string(),
            null_values: vec![String::new()],
            use_mmap: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WriterConfig {
    pub write_header: bool,

    /// Output CSV delimiter, independent of the source delimiter.
    #[validate(length(equal = 1))]
    pub delimiter: String,

    #[validate(length(min = 1))]
    pub compression: String,
}

impl WriterConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.delimiter)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            write_header: true,
            delimiter: ",".to_string(),
            compression: DEFAULT_COMPRESSION.to_string(),
        }
    }
}

/// Default applied to one field by the fill step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FillRule {
    #[validate(length(min = 1))]
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CleaningConfig {
    #[validate(nested)]
    pub fill: Vec<FillRule>,

    #[validate(length(min = 1))]
    pub sentinel_field: String,

    pub sentinel_value: Value,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            fill: vec![
                FillRule {
                    field: TEMPERATURE_FIELD.to_string(),
                    value: Value::Integer(0),
                },
                FillRule {
                    field: HUMIDITY_FIELD.to_string(),
                    value: Value::Integer(0),
                },
            ],
            sentinel_field: TEMPERATURE_FIELD.to_string(),
            sentinel_value: Value::Integer(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldRename {
    #[validate(length(min = 1))]
    pub from: String,

    #[validate(length(min = 1))]
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransformConfig {
    #[validate(nested)]
    pub renames: Vec<FieldRename>,

    #[validate(length(min = 1))]
    pub celsius_field: String,

    #[validate(length(min = 1))]
    pub fahrenheit_field: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            renames: vec![
                FieldRename {
                    from: TEMPERATURE_C_FIELD.to_string(),
                    to: CELSIUS_FIELD.to_string(),
                },
                FieldRename {
                    from: HUMIDITY_PCT_FIELD.to_string(),
                    to: HUMIDITY_PERCENT_FIELD.to_string(),
                },
            ],
            celsius_field: CELSIUS_FIELD.to_string(),
            fahrenheit_field: FAHRENHEIT_FIELD.to_string(),
        }
    }
}

/// Everything a pipeline run needs, loaded once and handed to each stage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[validate(length(min = 1))]
    pub source: String,

    #[validate(length(min = 1))]
    pub sink: String,

    pub format: OutputFormat,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    #[validate(nested)]
    pub reader: ReaderConfig,

    #[validate(nested)]
    pub writer: WriterConfig,

    #[validate(nested)]
    pub cleaning: CleaningConfig,

    #[validate(nested)]
    pub transform: TransformConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            sink: DEFAULT_SINK.to_string(),
            format: OutputFormat::Csv,
            max_workers: num_cpus::get(),
            reader: ReaderConfig::default(),
            writer: WriterConfig::default(),
            cleaning: CleaningConfig::default(),
            transform: TransformConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Layer built-in defaults, an optional TOML file and `WEATHER_ETL_*`
    /// environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field-level validation plus the cross-field checks the derive cannot express.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.reader.delimiter_byte()?;
        self.writer.delimiter_byte()?;

        if self.transform.renames.iter().any(|r| r.from == r.to) {
            return Err(ProcessingError::Config(
                "Rename source and target must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        if let Some(source) = source {
            self.source = source;
        }
        self
    }

    pub fn with_sink(mut self, sink: Option<String>) -> Self {
        if let Some(sink) = sink {
            self.sink = sink;
        }
        self
    }

    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        if let Some(max_workers) = max_workers {
            self.max_workers = max_workers;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_original_job() {
        let config = PipelineConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.source, "s3://weather-data-ingestion/");
        assert_eq!(config.sink, "s3://weather-data-ingestion/Processed_data/");
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.cleaning.fill.len(), 2);
        assert_eq!(config.cleaning.sentinel_field, "Temperature");
        assert_eq!(
            config.transform.renames[0],
            FieldRename {
                from: "Temperature_C".to_string(),
                to: "Temp_Celsius".to_string()
            }
        );
    }

    #[test]
    fn test_load_from_toml_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
source = "data/raw/"
sink = "data/out/"
format = "parquet"
max_workers = 2

[reader]
delimiter = ";"

[[cleaning.fill]]
field = "Temperature"
value = -1

[transform]
celsius_field = "Temperature"
"#
        )?;

        let config = PipelineConfig::load(Some(file.path()))?;
        assert_eq!(config.source, "data/raw/");
        assert_eq!(config.format, OutputFormat::Parquet);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.reader.delimiter_byte()?, b';');
        assert_eq!(config.writer.delimiter_byte()?, b',');
        assert!(config.reader.with_header);
        assert_eq!(config.cleaning.fill.len(), 1);
        assert_eq!(config.cleaning.fill[0].field, "Temperature");
        assert_eq!(config.cleaning.fill[0].value, Value::Integer(-1));
        assert_eq!(config.transform.celsius_field, "Temperature");
        assert_eq!(config.transform.fahrenheit_field, "Temp_Fahrenheit");
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
[writer]
compression = "gzip"
"#
        )?;

        // Keys untouched by the other loading tests, which share the process environment.
        std::env::set_var("WEATHER_ETL_WRITER__COMPRESSION", "zstd");
        std::env::set_var("WEATHER_ETL_CLEANING__SENTINEL_VALUE", "-99");
        let loaded = PipelineConfig::load(Some(file.path()));
        std::env::remove_var("WEATHER_ETL_WRITER__COMPRESSION");
        std::env::remove_var("WEATHER_ETL_CLEANING__SENTINEL_VALUE");

        let config = loaded?;
        assert_eq!(config.writer.compression, "zstd");
        assert_eq!(config.cleaning.sentinel_value, Value::Integer(-99));
        assert_eq!(config.cleaning.sentinel_field, "Temperature");
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.reader.delimiter = ";;".to_string();
        assert!(config.check().is_err());

        let mut config = PipelineConfig::default();
        config.max_workers = 0;
        assert!(matches!(config.check(), Err(ProcessingError::Validation(_))));

        let mut config = PipelineConfig::default();
        config.transform.renames.push(FieldRename {
            from: "A".to_string(),
            to: "A".to_string(),
        });
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let config = PipelineConfig::default()
            .with_source(Some("in/".to_string()))
            .with_sink(None)
            .with_format(Some(OutputFormat::Parquet))
            .with_max_workers(Some(3));

        assert_eq!(config.source, "in/");
        assert_eq!(config.sink, DEFAULT_SINK);
        assert_eq!(config.format, OutputFormat::Parquet);
        assert_eq!(config.max_workers, 3);
    }
}
