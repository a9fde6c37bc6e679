use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::processors::CleaningStats;

/// Record counts and timings for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub source: String,
    pub sink: Option<String>,
    pub objects_read: usize,
    pub records_read: usize,
    pub after_dedupe: usize,
    pub fields_filled: usize,
    pub after_sentinel_filter: usize,
    pub after_null_drop: usize,
    pub records_written: usize,
    pub output_fields: Vec<String>,
    pub elapsed_ms: u128,
}

impl RunReport {
    pub fn new(source: &str) -> Self {
        Self {
            started_at: Utc::now(),
            source: source.to_string(),
            sink: None,
            objects_read: 0,
            records_read: 0,
            after_dedupe: 0,
            fields_filled: 0,
            after_sentinel_filter: 0,
            after_null_drop: 0,
            records_written: 0,
            output_fields: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn apply_cleaning(&mut self, stats: &CleaningStats) {
        self.after_dedupe = stats.after_dedupe;
        self.fields_filled = stats.fields_filled;
        self.after_sentinel_filter = stats.after_sentinel_filter;
        self.after_null_drop = stats.after_null_drop;
    }

    pub fn duplicates_removed(&self) -> usize {
        self.records_read.saturating_sub(self.after_dedupe)
    }

    pub fn sentinel_dropped(&self) -> usize {
        self.after_dedupe.saturating_sub(self.after_sentinel_filter)
    }

    pub fn null_dropped(&self) -> usize {
        self.after_sentinel_filter.saturating_sub(self.after_null_drop)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Pipeline Run Summary:\n");
        summary.push_str(&format!(
            "  Started: {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        summary.push_str(&format!("  Source: {} ({} objects)\n", self.source, self.objects_read));
        summary.push_str(&format!("  Records read: {}\n", self.records_read));
        summary.push_str(&format!(
            "  Duplicates removed: {}\n",
            self.duplicates_removed()
        ));
        summary.push_str(&format!("  Fields filled with default: {}\n", self.fields_filled));
        summary.push_str(&format!(
            "  Dropped by sentinel filter: {}\n",
            self.sentinel_dropped()
        ));
        summary.push_str(&format!("  Dropped with null fields: {}\n", self.null_dropped()));
        summary.push_str(&format!("  Output fields: {}\n", self.output_fields.join(", ")));
        match &self.sink {
            Some(sink) => summary.push_str(&format!(
                "  Records written: {} -> {}\n",
                self.records_written, sink
            )),
            None => summary.push_str("  Records written: none (no output)\n"),
        }
        summary.push_str(&format!("  Elapsed: {} ms", self.elapsed_ms));
        summary
    }
}
