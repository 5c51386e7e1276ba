use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
