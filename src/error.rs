use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SicoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid download pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("No file found in {}", .dir.display())]
    NoDownload { dir: PathBuf },

    #[error("Multiple files found in {} ({count} candidates)", .dir.display())]
    MultipleDownloads { dir: PathBuf, count: usize },

    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown month abbreviation: {0}")]
    UnknownMonth(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid total {value:?} for {context}")]
    InvalidTotal { value: String, context: String },

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Duplicate snapshot entry: {date} {category}")]
    DuplicateSnapshotKey { date: String, category: String },

    #[error("Reconciliation error: {0}")]
    Reconciliation(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SicoError>;
