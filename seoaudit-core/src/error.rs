use seoaudit_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("No URLs provided for audit")]
    MissingUrls,

    #[error("No ticket name provided")]
    MissingTicket,

    #[error("Invalid sitemap mapping: {0}")]
    InvalidMapping(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scanner error: {0}")]
    Scan(#[from] ScanError),
}

pub type Result<T> = std::result::Result<T, AuditError>;
