use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Fatal failures while loading the station directory. No partial station
/// list is ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Could not read station list from '{path}'")]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse station list at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Station list contains no stations")]
    Empty,
}

/// Recoverable failures inside a single observation stream. These are logged
/// and dropped by the import pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("csv does not contain header {0}")]
    MissingHeader(&'static str),

    #[error("Could not read csv: {0}")]
    Unreadable(String),

    #[error("Could not parse timestamp '{value}'")]
    Timestamp { value: String },

    #[error("Could not parse {field} from '{value}'")]
    Field { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink rejected observation: {0}")]
    Sink(String),
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
