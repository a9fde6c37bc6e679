/// Field names used by the weather ingestion job
pub const TEMPERATURE_FIELD: &str = "Temperature";
pub const HUMIDITY_FIELD: &str = "Humidity";
pub const TEMPERATURE_C_FIELD: &str = "Temperature_C";
pub const HUMIDITY_PCT_FIELD: &str = "Humidity_pct";
pub const CELSIUS_FIELD: &str = "Temp_Celsius";
pub const HUMIDITY_PERCENT_FIELD: &str = "Humidity_Percent";
pub const FAHRENHEIT_FIELD: &str = "Temp_Fahrenheit";

/// Storage locations
pub const DEFAULT_SOURCE: &str = "s3://weather-data-ingestion/";
pub const DEFAULT_SINK: &str = "s3://weather-data-ingestion/Processed_data/";
pub const S3_SCHEME: &str = "s3://";
pub const FILE_SCHEME: &str = "file://";

/// Output object name used when the sink is a prefix or directory
pub const PART_FILE_STEM: &str = "part-00000";

/// Configuration
pub const ENV_PREFIX: &str = "WEATHER_ETL";

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
pub const DEFAULT_COMPRESSION: &str = COMPRESSION_SNAPPY;
