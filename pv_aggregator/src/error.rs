use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("Parse error on line {line}, column {column}: {value:?} ({reason})")]
    Parse {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Year {0} is not present in the loaded data")]
    UnknownYear(i32),

    #[error("Month {0:?} is not present in the loaded data")]
    UnknownMonth(String),
}

pub type Result<T> = std::result::Result<T, DataLoadError>;
