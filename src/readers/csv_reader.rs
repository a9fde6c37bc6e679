use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::config::ReaderConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, Record, Schema, Value};
use crate::storage::{ObjectStorage, StorageLocation, StoredObject};

/// Reads delimited weather records from object storage into a [`Dataset`].
pub struct SourceReader {
    config: ReaderConfig,
}

impl SourceReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read every object at `location` and union them. Returns the dataset and
    /// the number of objects read.
    pub async fn read(
        &self,
        storage: &ObjectStorage,
        location: &StorageLocation,
    ) -> Result<(Dataset, usize)> {
        let objects = storage.read(location).await?;
        let count = objects.len();
        let dataset = self.parse_objects(&objects)?;
        Ok((dataset, count))
    }

    /// Union parsed objects. Every non-empty object must carry the same header.
    pub fn parse_objects(&self, objects: &[StoredObject]) -> Result<Dataset> {
        let mut dataset = Dataset::default();
        for object in objects {
            match self.parse_object(object)? {
                Some(part) => dataset.extend(part, &object.location)?,
                None => warn!(location = %object.location, "skipping empty object"),
            }
        }
        Ok(dataset)
    }

    /// Parse one object. `None` when it holds no header and no rows.
    pub fn parse_object(&self, object: &StoredObject) -> Result<Option<Dataset>> {
        // Strips a UTF-8 BOM; malformed sequences become U+FFFD.
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(object.bytes.as_slice());
        if had_errors {
            warn!(location = %object.location, "invalid UTF-8 replaced while decoding");
        }
        self.parse_text(&text, &object.location)
    }

    pub fn parse_text(&self, text: &str, location: &str) -> Result<Option<Dataset>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(self.config.with_header)
            .delimiter(self.config.delimiter_byte()?)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        let mut row = StringRecord::new();
        while reader.read_record(&mut row)? {
            rows.push(self.parse_row(&row));
        }

        let schema = if self.config.with_header {
            let headers = reader.headers()?;
            if headers.is_empty() && rows.is_empty() {
                return Ok(None);
            }
            Schema::new(headers.iter()).map_err(|e| {
                ProcessingError::InvalidFormat(format!("Bad header in {}: {}", location, e))
            })?
        } else {
            match rows.first() {
                Some(first) => Schema::positional(first.values().len()),
                None => return Ok(None),
            }
        };

        debug!(
            location = %location,
            fields = schema.len(),
            records = rows.len(),
            "parsed delimited object"
        );

        Dataset::new(schema, rows)
            .map(Some)
            .map_err(|e| ProcessingError::InvalidFormat(format!("{} in {}", e, location)))
    }

    fn parse_row(&self, row: &StringRecord) -> Record {
        Record::new(
            row.iter()
                .map(|cell| Value::parse(cell, &self.config.null_values))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectBytes;
    use pretty_assertions::assert_eq;

    fn object(location: &str, text: &str) -> StoredObject {
        StoredObject {
            location: location.to_string(),
            bytes: ObjectBytes::Owned(text.as_bytes().to_vec()),
        }
    }

    #[test]
    fn test_parse_with_header() {
        let reader = SourceReader::new(ReaderConfig::default());
        let dataset = reader
            .parse_text("Temperature,Humidity\n20,50\n,30\n", "weather.csv")
            .unwrap()
            .unwrap();

        assert_eq!(dataset.schema().fields(), &["Temperature", "Humidity"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.records()[1].values(),
            &[Value::Null, Value::Integer(30)]
        );
    }

    #[test]
    fn test_short_rows_become_missing_fields() {
        let reader = SourceReader::new(ReaderConfig::default());
        let dataset = reader
            .parse_text("Temperature,Humidity\n20\n", "weather.csv")
            .unwrap()
            .unwrap();

        assert!(dataset.records()[0].is_missing(1));
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let reader = SourceReader::new(ReaderConfig::default());
        let result = reader.parse_text("Temperature\n20,50\n", "weather.csv");
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_headerless_input_uses_positional_names() {
        let config = ReaderConfig {
            with_header: false,
            delimiter: ";".to_string(),
            ..ReaderConfig::default()
        };
        let reader = SourceReader::new(config);
        let dataset = reader.parse_text("20;50\n21;51\n", "raw.csv").unwrap().unwrap();

        assert_eq!(dataset.schema().fields(), &["col0", "col1"]);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_bom_is_stripped_from_header() {
        let reader = SourceReader::new(ReaderConfig::default());
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Temperature\n20\n");
        let object = StoredObject {
            location: "bom.csv".to_string(),
            bytes: ObjectBytes::Owned(bytes),
        };

        let dataset = reader.parse_object(&object).unwrap().unwrap();
        assert_eq!(dataset.schema().fields(), &["Temperature"]);
    }

    #[test]
    fn test_union_of_objects() {
        let reader = SourceReader::new(ReaderConfig::default());
        let objects = vec![
            object("a.csv", "Temperature,Humidity\n20,50\n"),
            object("empty.csv", ""),
            object("b.csv", "Temperature,Humidity\n21,51\n"),
        ];

        let dataset = reader.parse_objects(&objects).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_mismatched_headers_are_rejected() {
        let reader = SourceReader::new(ReaderConfig::default());
        let objects = vec![
            object("a.csv", "Temperature,Humidity\n20,50\n"),
            object("b.csv", "Humidity,Temperature\n51,21\n"),
        ];

        let result = reader.parse_objects(&objects);
        assert!(matches!(result, Err(ProcessingError::SchemaMismatch { .. })));
    }
}
