use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("{message}")]
    Store { path: String, message: String },

    #[error("{message}")]
    Walk { path: PathBuf, message: String },

    #[error("Report write failed: {0}")]
    Report(#[source] std::io::Error),
}

impl SweepError {
    /// Only a broken report destination stops the sweep; everything else
    /// becomes an ERROR line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SweepError::Report(_))
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
