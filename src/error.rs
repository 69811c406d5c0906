use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Archive extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Malformed record at {path}:{line}: expected at least {expected} fields, found {found}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Truncated record at {path}:{line}: expected at least {required} characters, found {found}")]
    TruncatedRecord {
        path: PathBuf,
        line: u64,
        required: usize,
        found: usize,
    },

    #[error("Record count mismatch between merge inputs: {}", describe_counts(.counts))]
    RecordCountMismatch { counts: Vec<(PathBuf, usize)> },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Delimited read failed on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown pipeline step: {0}")]
    UnknownStep(String),
}

impl EtlError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtlError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        EtlError::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn extraction(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EtlError::Extraction {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn describe_counts(counts: &[(PathBuf, usize)]) -> String {
    counts
        .iter()
        .map(|(path, count)| format!("{}={}", path.display(), count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, EtlError>;
