use csv::WriterBuilder;

use crate::error::{ProcessingError, Result};
use crate::models::Dataset;

/// Encodes a dataset as delimited text.
pub struct CsvWriter {
    write_header: bool,
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            write_header: true,
            delimiter: b',',
        }
    }

    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        if self.write_header {
            writer.write_record(dataset.schema().fields())?;
        }

        for record in dataset.records() {
            writer.write_record(record.values().iter().map(|v| v.to_cell()))?;
        }

        writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use pretty_assertions::assert_eq;

    fn sample() -> Dataset {
        Dataset::from_rows(
            ["Temp_Celsius", "Humidity_Percent", "Temp_Fahrenheit", "Station"],
            vec![
                vec![
                    Value::Integer(20),
                    Value::Integer(50),
                    Value::Float(68.0),
                    "Leeds, UK".into(),
                ],
                vec![
                    Value::Float(21.5),
                    Value::Integer(51),
                    Value::Float(70.7),
                    Value::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_with_header() {
        let bytes = CsvWriter::new().encode(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Temp_Celsius,Humidity_Percent,Temp_Fahrenheit,Station\n\
             20,50,68,\"Leeds, UK\"\n\
             21.5,51,70.7,\n"
        );
    }

    #[test]
    fn test_encode_without_header() {
        let bytes = CsvWriter::new()
            .with_header(false)
            .with_delimiter(b';')
            .encode(&sample())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("20;50;68;Leeds, UK\n"));
    }
}
