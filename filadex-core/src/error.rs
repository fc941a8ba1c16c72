/// Errors that can occur while normalizing a vendor record.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("record has an empty '{0}' after normalization")]
    EmptyField(&'static str),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
