use thiserror::Error;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(i64),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DossierError>;
