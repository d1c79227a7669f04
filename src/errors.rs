use thiserror::Error;

/// Error types for camera scanning operations
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown camera type: {0}")]
    UnknownCameraType(String),

    #[error("Search Error: {0}")]
    Search(String),

    #[error("Import Error: {0}")]
    Import(String),

    #[error("Store Error: {0}")]
    Store(String),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode Error: {0}")]
    Decode(#[from] serde_json::Error),
}
