pub mod cleaner;
pub mod pipeline;
pub mod transformer;

pub use cleaner::{Cleaner, CleaningStats};
pub use pipeline::{process_dataset, Pipeline, PipelineContext, RunOptions};
pub use transformer::{celsius_to_fahrenheit, FahrenheitDeriver, Transformer};
