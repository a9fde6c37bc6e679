use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::{CleaningConfig, FillRule};
use crate::error::Result;
use crate::models::{Dataset, Value};

/// Record counts after each cleaning step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub after_dedupe: usize,
    pub fields_filled: usize,
    pub after_sentinel_filter: usize,
    pub after_null_drop: usize,
}

/// Dedupe, fill, sentinel filter and null drop, in that order.
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn clean(&self, dataset: Dataset) -> Result<(Dataset, CleaningStats)> {
        let mut stats = CleaningStats::default();
        let input = dataset.len();

        let dataset = drop_duplicates(dataset);
        stats.after_dedupe = dataset.len();
        info!(
            before = input,
            after = stats.after_dedupe,
            "removed duplicate records"
        );

        let doomed = self.filled_with_sentinel(&dataset);
        let (dataset, filled) = fill_missing(dataset, &self.config.fill);
        stats.fields_filled = filled;
        info!(filled, "filled missing values with defaults");

        let dataset = filter_sentinel(
            dataset,
            &self.config.sentinel_field,
            &self.config.sentinel_value,
        )?;
        stats.after_sentinel_filter = dataset.len();
        info!(
            field = %self.config.sentinel_field,
            sentinel = %self.config.sentinel_value,
            remaining = stats.after_sentinel_filter,
            "filtered sentinel records"
        );
        if doomed > 0 {
            warn!(
                field = %self.config.sentinel_field,
                records = doomed,
                "records with a missing sentinel field were filled with the sentinel and dropped"
            );
        }

        let dataset = drop_any_null(dataset);
        stats.after_null_drop = dataset.len();
        info!(remaining = stats.after_null_drop, "dropped records with null fields");

        Ok((dataset, stats))
    }

    /// Records whose sentinel field is missing and whose fill default equals
    /// the sentinel. The filter step drops every one of them.
    fn filled_with_sentinel(&self, dataset: &Dataset) -> usize {
        let fills_sentinel = self.config.fill.iter().any(|rule| {
            rule.field == self.config.sentinel_field && rule.value == self.config.sentinel_value
        });
        match dataset.schema().index_of(&self.config.sentinel_field) {
            Some(index) if fills_sentinel => dataset
                .records()
                .iter()
                .filter(|record| record.is_missing(index))
                .count(),
            _ => 0,
        }
    }
}

/// Keep the first occurrence of each field-wise-equal record.
pub fn drop_duplicates(dataset: Dataset) -> Dataset {
    let (schema, records) = dataset.into_parts();

    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(records.len());
        records.iter().map(|record| seen.insert(record)).collect()
    };

    let records = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();

    Dataset::from_parts(schema, records)
}

/// Set absent or null values of the listed fields to their defaults.
///
/// Fields missing from the schema are skipped. Returns the number of values filled.
pub fn fill_missing(dataset: Dataset, rules: &[FillRule]) -> (Dataset, usize) {
    let targets: Vec<(usize, Value)> = rules
        .iter()
        .filter_map(|rule| match dataset.schema().index_of(&rule.field) {
            Some(index) => Some((index, rule.value.clone())),
            None => {
                warn!(field = %rule.field, "fill field not present in schema, skipping");
                None
            }
        })
        .collect();

    if targets.is_empty() {
        return (dataset, 0);
    }

    let (schema, mut records) = dataset.into_parts();

    let filled: usize = records
        .par_iter_mut()
        .map(|record| {
            let mut count = 0usize;
            for (index, value) in &targets {
                if record.is_missing(*index) {
                    record.set(*index, value.clone());
                    count += 1;
                }
            }
            count
        })
        .sum();

    (Dataset::from_parts(schema, records), filled)
}

/// Drop records whose `field` equals `sentinel`.
pub fn filter_sentinel(dataset: Dataset, field: &str, sentinel: &Value) -> Result<Dataset> {
    let index = dataset
        .schema()
        .require(field, &format!("filter {} != {}", field, sentinel))?;
    let (schema, records) = dataset.into_parts();

    let records = records
        .into_par_iter()
        .filter(|record| record.get(index) != Some(sentinel))
        .collect();

    Ok(Dataset::from_parts(schema, records))
}

/// Drop records with any null field.
pub fn drop_any_null(dataset: Dataset) -> Dataset {
    let (schema, records) = dataset.into_parts();
    let records = records
        .into_par_iter()
        .filter(|record| !record.has_null())
        .collect();
    Dataset::from_parts(schema, records)
}
