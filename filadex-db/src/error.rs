use std::path::PathBuf;

/// Errors that can occur while reading or writing database artifacts.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// An expected per-vendor artifact is absent. Fatal for the merge:
    /// proceeding would silently drop an entire vendor from the output.
    #[error("missing vendor artifact for '{vendor}': {}", path.display())]
    MissingArtifact { vendor: &'static str, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
