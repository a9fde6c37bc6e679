use std::fmt;
use std::path::PathBuf;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{FILE_SCHEME, PART_FILE_STEM, S3_SCHEME};

/// Where a dataset is read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Local(PathBuf),
    S3 { bucket: String, key: String },
}

impl StorageLocation {
    /// Parse `s3://bucket/key`, `file://path` or a plain filesystem path.
    ///
    /// Whitespace around the bucket name is dropped, so `s3://bucket /` is read
    /// as `s3://bucket/`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProcessingError::Config("Empty storage location".to_string()));
        }

        if let Some(rest) = raw.strip_prefix(S3_SCHEME) {
            let (bucket, key) = match rest.split_once('/') {
                Some((bucket, key)) => (bucket.trim(), key.trim_start()),
                None => (rest.trim(), ""),
            };
            if bucket.is_empty() || bucket.contains(char::is_whitespace) {
                return Err(ProcessingError::Config(format!(
                    "Invalid S3 bucket in location '{}'",
                    raw
                )));
            }
            return Ok(StorageLocation::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let path = raw.strip_prefix(FILE_SCHEME).unwrap_or(raw);
        Ok(StorageLocation::Local(PathBuf::from(path)))
    }

    /// True when the location names a prefix or directory rather than one object.
    pub fn is_prefix(&self) -> bool {
        match self {
            StorageLocation::Local(path) => {
                path.as_os_str().to_string_lossy().ends_with('/') || path.is_dir()
            }
            StorageLocation::S3 { key, .. } => key.is_empty() || key.ends_with('/'),
        }
    }

    /// Child object `name` under this location.
    pub fn join(&self, name: &str) -> Self {
        match self {
            StorageLocation::Local(path) => StorageLocation::Local(path.join(name)),
            StorageLocation::S3 { bucket, key } => {
                let key = if key.is_empty() || key.ends_with('/') {
                    format!("{}{}", key, name)
                } else {
                    format!("{}/{}", key, name)
                };
                StorageLocation::S3 {
                    bucket: bucket.clone(),
                    key,
                }
            }
        }
    }

    /// The object a writer should create: `part-00000.<ext>` under a prefix,
    /// otherwise the location itself.
    pub fn output_object(&self, extension: &str) -> Self {
        if self.is_prefix() {
            self.join(&format!("{}.{}", PART_FILE_STEM, extension))
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::Local(path) => write!(f, "{}", path.display()),
            StorageLocation::S3 { bucket, key } => write!(f, "{}{}/{}", S3_SCHEME, bucket, key),
        }
    }
}

/// True for bookkeeping objects (`_SUCCESS`, `.crc`, dotfiles) that readers skip.
pub fn is_hidden_object(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_s3_locations() {
        assert_eq!(
            StorageLocation::parse("s3://weather-data-ingestion/Processed_data/").unwrap(),
            StorageLocation::S3 {
                bucket: "weather-data-ingestion".to_string(),
                key: "Processed_data/".to_string()
            }
        );
        assert_eq!(
            StorageLocation::parse("s3://bucket").unwrap(),
            StorageLocation::S3 {
                bucket: "bucket".to_string(),
                key: String::new()
            }
        );
    }

    #[test]
    fn test_stray_space_before_slash_is_dropped() {
        let location = StorageLocation::parse("s3://weather-data-ingestion /").unwrap();
        assert_eq!(location.to_string(), "s3://weather-data-ingestion/");
        assert!(location.is_prefix());
    }

    #[test]
    fn test_invalid_locations() {
        assert!(StorageLocation::parse("").is_err());
        assert!(StorageLocation::parse("s3:///key").is_err());
        assert!(StorageLocation::parse("s3://my bucket/key").is_err());
    }

    #[test]
    fn test_local_locations() {
        assert_eq!(
            StorageLocation::parse("file:///tmp/weather.csv").unwrap(),
            StorageLocation::Local(PathBuf::from("/tmp/weather.csv"))
        );
        assert!(StorageLocation::parse("out/").unwrap().is_prefix());
        assert!(!StorageLocation::parse("out/result.csv").unwrap().is_prefix());
    }

    #[test]
    fn test_output_object() {
        let prefix = StorageLocation::parse("s3://bucket/Processed_data/").unwrap();
        assert_eq!(
            prefix.output_object("csv").to_string(),
            "s3://bucket/Processed_data/part-00000.csv"
        );

        let single = StorageLocation::parse("s3://bucket/out.csv").unwrap();
        assert_eq!(single.output_object("csv"), single);

        let root = StorageLocation::parse("s3://bucket").unwrap();
        assert_eq!(root.output_object("parquet").to_string(), "s3://bucket/part-00000.parquet");
    }

    #[test]
    fn test_hidden_objects() {
        assert!(is_hidden_object("_SUCCESS"));
        assert!(is_hidden_object(".part-00000.csv.crc"));
        assert!(!is_hidden_object("weather_2024.csv"));
    }
}
