use rayon::prelude::*;
use tracing::info;

use crate::config::{FieldRename, TransformConfig};
use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, Record, Schema, Value};

/// Convert a Celsius reading to Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Renames fields and derives the Fahrenheit column.
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn transform(&self, dataset: Dataset) -> Result<Dataset> {
        let dataset = apply_renames(dataset, &self.config.renames)?;
        let dataset = derive_fahrenheit(
            dataset,
            &self.config.celsius_field,
            &self.config.fahrenheit_field,
        )?;

        info!(
            records = dataset.len(),
            fields = %dataset.schema().header_line(),
            "transformed records"
        );
        Ok(dataset)
    }
}

/// Rename one field. Fails when `from` is absent or `to` is already taken.
pub fn rename_field(mut dataset: Dataset, from: &str, to: &str) -> Result<Dataset> {
    dataset.schema_mut().rename(from, to)?;
    Ok(dataset)
}

pub fn apply_renames(dataset: Dataset, renames: &[FieldRename]) -> Result<Dataset> {
    renames.iter().try_fold(dataset, |dataset, rename| {
        info!(from = %rename.from, to = %rename.to, "renaming field");
        rename_field(dataset, &rename.from, &rename.to)
    })
}

/// Per-record Fahrenheit derivation bound to field positions of one schema.
#[derive(Debug, Clone, Copy)]
pub struct FahrenheitDeriver {
    source: usize,
    target: usize,
}

impl FahrenheitDeriver {
    /// Resolve `celsius_field` and append `fahrenheit_field` to the schema if it is new.
    pub fn bind(schema: &mut Schema, celsius_field: &str, fahrenheit_field: &str) -> Result<Self> {
        let operation = format!("derive {} from {}", fahrenheit_field, celsius_field);
        let source = schema.require(celsius_field, &operation)?;
        let target = match schema.index_of(fahrenheit_field) {
            Some(index) => index,
            None => schema.push(fahrenheit_field.to_string(), &operation)?,
        };
        Ok(Self { source, target })
    }

    /// Set the Fahrenheit value from the Celsius value of `record`.
    pub fn apply(&self, mut record: Record) -> Result<Record> {
        let celsius = match record.get(self.source) {
            Some(value) => value.as_f64().ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Cannot convert {} value '{}' to Fahrenheit",
                    value.type_name(),
                    value
                ))
            })?,
            None => {
                return Err(ProcessingError::InvalidFormat(
                    "Record is missing its Celsius value".to_string(),
                ))
            }
        };

        record.set(self.target, Value::Float(celsius_to_fahrenheit(celsius)));
        Ok(record)
    }
}

/// Derive `fahrenheit_field` for every record.
pub fn derive_fahrenheit(
    dataset: Dataset,
    celsius_field: &str,
    fahrenheit_field: &str,
) -> Result<Dataset> {
    let (mut schema, records) = dataset.into_parts();
    let deriver = FahrenheitDeriver::bind(&mut schema, celsius_field, fahrenheit_field)?;

    let records = records
        .into_par_iter()
        .map(|record| deriver.apply(record))
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::from_parts(schema, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn renamed_input() -> Dataset {
        Dataset::from_rows(
            ["Temperature_C", "Humidity_pct"],
            vec![
                vec![Value::Integer(20), Value::Integer(50)],
                vec![Value::Float(-40.0), Value::Integer(10)],
                vec![Value::Float(36.6), Value::Integer(80)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(20.0) - 68.0).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(-40.0) - -40.0).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_with_default_mapping() {
        let transformer = Transformer::new(TransformConfig::default());
        let dataset = transformer.transform(renamed_input()).unwrap();

        assert_eq!(
            dataset.schema().fields(),
            &["Temp_Celsius", "Humidity_Percent", "Temp_Fahrenheit"]
        );

        let schema = dataset.schema();
        for record in dataset.records() {
            let c = record.field(schema, "Temp_Celsius").and_then(Value::as_f64).unwrap();
            let f = record.field(schema, "Temp_Fahrenheit").and_then(Value::as_f64).unwrap();
            assert!((f - (c * 9.0 / 5.0 + 32.0)).abs() < 1e-9);
        }
        assert_eq!(
            dataset.records()[0].field(schema, "Temp_Fahrenheit"),
            Some(&Value::Float(68.0))
        );
    }

    #[test]
    fn test_rename_missing_field_aborts() {
        let dataset = Dataset::from_rows(["Temperature"], vec![vec![Value::Integer(20)]]).unwrap();
        let transformer = Transformer::new(TransformConfig::default());
        let err = transformer.transform(dataset).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingField { ref field, .. } if field == "Temperature_C"));
    }

    #[test]
    fn test_rename_round_trip_restores_schema() {
        let original = renamed_input();
        let schema = original.schema().clone();

        let renamed = rename_field(original, "Humidity_pct", "Humidity_Percent").unwrap();
        let restored = rename_field(renamed, "Humidity_Percent", "Humidity_pct").unwrap();
        assert_eq!(restored.schema(), &schema);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let once = derive_fahrenheit(renamed_input(), "Temperature_C", "Temp_Fahrenheit").unwrap();
        let twice = derive_fahrenheit(once.clone(), "Temperature_C", "Temp_Fahrenheit").unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.schema().len(), 3);
    }

    #[test]
    fn test_derive_overwrites_existing_target() {
        let dataset = Dataset::from_rows(
            ["Temp_Celsius", "Temp_Fahrenheit"],
            vec![vec![Value::Integer(100), Value::Integer(0)]],
        )
        .unwrap();

        let derived = derive_fahrenheit(dataset, "Temp_Celsius", "Temp_Fahrenheit").unwrap();
        assert_eq!(derived.records()[0].get(1), Some(&Value::Float(212.0)));
    }

    #[test]
    fn test_derive_rejects_non_numeric_celsius() {
        let dataset = Dataset::from_rows(["Temp_Celsius"], vec![vec!["warm".into()]]).unwrap();
        let result = derive_fahrenheit(dataset, "Temp_Celsius", "Temp_Fahrenheit");
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_derive_requires_celsius_field() {
        let dataset = Dataset::from_rows(["Temperature"], vec![vec![Value::Integer(20)]]).unwrap();
        let result = derive_fahrenheit(dataset, "Temp_Celsius", "Temp_Fahrenheit");
        assert!(matches!(result, Err(ProcessingError::MissingField { .. })));
    }
}
