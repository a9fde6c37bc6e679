use crate::error::{ProcessingError, Result};
use crate::models::{Record, Schema, Value};

/// A schema plus the records read from one or more source objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, padding short rows with nulls.
    pub fn new(schema: Schema, records: Vec<Record>) -> Result<Self> {
        let width = schema.len();
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, mut record)| {
                if record.values().len() > width {
                    return Err(ProcessingError::InvalidFormat(format!(
                        "Record {} has {} fields but schema has {}",
                        i,
                        record.values().len(),
                        width
                    )));
                }
                record.pad_to(width);
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, records })
    }

    /// Convenience constructor used by tests and benchmarks.
    pub fn from_rows<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let schema = Schema::new(fields)?;
        Self::new(schema, rows.into_iter().map(Record::new).collect())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Schema, Vec<Record>) {
        (self.schema, self.records)
    }

    /// Reassemble a dataset whose records are already aligned with `schema`.
    pub fn from_parts(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Append another dataset with an identical schema.
    pub fn extend(&mut self, other: Dataset, location: &str) -> Result<()> {
        if self.schema.is_empty() && self.records.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.schema != other.schema {
            return Err(ProcessingError::SchemaMismatch {
                location: location.to_string(),
                expected: self.schema.header_line(),
                found: other.schema.header_line(),
            });
        }
        self.records.extend(other.records);
        Ok(())
    }
}
