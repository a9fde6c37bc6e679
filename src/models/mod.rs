pub mod dataset;
pub mod record;
pub mod report;
pub mod value;

pub use dataset::Dataset;
pub use record::{Record, Schema};
pub use report::RunReport;
pub use value::Value;
