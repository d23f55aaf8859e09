pub mod classifier;
pub mod error;
pub mod report;
pub mod types;

pub use classifier::{Classifier, ExclusionSet, KeywordSet};
pub use error::{SweepError, SweepResult};
pub use report::{contain, ReportSink, SweepStats, TextReport};
pub use types::*;
