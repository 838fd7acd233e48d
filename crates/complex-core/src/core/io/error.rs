use thiserror::Error;

/// Failure reading or writing a boundary file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// An upstream collaborator could not deliver a complete participation list for a
/// structure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Upstream data for structure '{structure_id}' is unavailable: {reason}")]
pub struct UpstreamFetchError {
    pub structure_id: String,
    pub reason: String,
}
