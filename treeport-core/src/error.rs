use thiserror::Error;
use treeport_client::ClientError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Duplicate key '{0}' while building reference index")]
    DuplicateKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
