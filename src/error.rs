use std::path::PathBuf;

/// Errors that abort an ownership run.
///
/// Per-file blame failures are not represented here: they are stored as
/// messages next to the file's entry and surface as blank report cells.
#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Repository could not be opened or inspected.
    #[error("git error: {}", .0.message())]
    Git(#[from] git2::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Alias table exists but a record could not be parsed.
    #[error("alias table {}: line {line}: {message}", path.display())]
    AliasTable {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Malformed CSV input.
    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },

    /// TOML config deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The directory to analyze does not exist.
    #[error("analysis root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A blame worker thread panicked.
    #[error("blame worker {0} panicked")]
    WorkerPanicked(usize),
}
