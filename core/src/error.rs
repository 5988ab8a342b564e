use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a corpus into an index. Fatal to construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("corpus is empty: no articles to index")]
    EmptyCorpus,
    #[error("record {record} is missing required field `{field}`")]
    Schema { record: usize, field: &'static str },
    #[error("duplicate article title {title:?} at records {first} and {second}")]
    DuplicateTitle { title: String, first: usize, second: usize },
}

/// Discriminant shared by query failures and the tagged outcome type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    NotFound,
    Internal,
}

/// Recoverable failures of a single recommendation query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Article not found: '{0}'")]
    NotFound(String),
}

impl QueryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            QueryError::InvalidInput(_) => FailureKind::InvalidInput,
            QueryError::NotFound(_) => FailureKind::NotFound,
        }
    }
}

/// Failures while reading a corpus from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse {path} (line {line}): {source}")]
    Parse { path: PathBuf, line: usize, #[source] source: serde_json::Error },
    #[error("no corpus files found under {0}")]
    NoFiles(PathBuf),
    #[error(transparent)]
    Index(#[from] IndexError),
}
