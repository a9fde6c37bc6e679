use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::Value;

/// Ordered, duplicate-free list of field names shared by every record of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Schema::default();
        for field in fields {
            schema.push(field.into(), "schema")?;
        }
        Ok(schema)
    }

    /// Positional names `col0`, `col1`, ... for headerless input.
    pub fn positional(width: usize) -> Self {
        Self {
            fields: (0..width).map(|i| format!("col{}", i)).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index_of(field).is_some()
    }

    /// Index of `field`, or a `MissingField` error naming `operation`.
    pub fn require(&self, field: &str, operation: &str) -> Result<usize> {
        self.index_of(field)
            .ok_or_else(|| ProcessingError::missing_field(field, operation))
    }

    /// Append a field and return its index.
    pub fn push(&mut self, field: String, operation: &str) -> Result<usize> {
        if self.contains(&field) {
            return Err(ProcessingError::DuplicateField {
                field,
                operation: operation.to_string(),
            });
        }
        self.fields.push(field);
        Ok(self.fields.len() - 1)
    }

    /// Rename `from` to `to` in place.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let operation = format!("rename {} -> {}", from, to);
        let index = self.require(from, &operation)?;
        if from != to && self.contains(to) {
            return Err(ProcessingError::DuplicateField {
                field: to.to_string(),
                operation,
            });
        }
        self.fields[index] = to.to_string();
        Ok(())
    }

    pub fn header_line(&self) -> String {
        self.fields.join(", ")
    }
}

/// One row of values, positionally aligned with its dataset's [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Set the value at `index`, padding with nulls if the row is short.
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value;
    }

    /// Pad with nulls up to `width` so absent trailing fields read as missing.
    pub fn pad_to(&mut self, width: usize) {
        if self.values.len() < width {
            self.values.resize(width, Value::Null);
        }
    }

    pub fn has_null(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }

    /// Absent (short row) or null.
    pub fn is_missing(&self, index: usize) -> bool {
        self.values.get(index).map_or(true, Value::is_null)
    }

    /// Look a value up by field name.
    pub fn field<'a>(&'a self, schema: &Schema, name: &str) -> Option<&'a Value> {
        schema.index_of(name).and_then(|i| self.get(i))
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Record::new(values)
    }
}
