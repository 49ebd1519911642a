/// Error types for dirscout.
///
/// Traversal failures carry the path that failed together with the underlying
/// I/O error, so a caller can report both without re-deriving context:
/// ```rust,ignore
/// match dirscout::search(&config) {
///     Ok(output) => // Report matches,
///     Err(SearchError::DirectoryList { path, source }) => // Directory could not be listed,
///     Err(SearchError::Usage(msg)) => // Bad invocation, nothing was searched,
///     Err(e) => // Anything else
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to list directory {}: {source}", path.display())]
    DirectoryList {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Usage error: {0}")]
    Usage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("Search cancelled after {directories_visited} directories and {files_scanned} files")]
    Cancelled {
        directories_visited: u64,
        files_scanned: u64,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SearchError {
    pub fn directory_list(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryList {
            path: path.into(),
            source,
        }
    }

    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
