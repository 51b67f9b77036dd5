use thiserror::Error;

/// Errors surfaced by the statistics and I/O layers.
///
/// Best-effort parsing (dates, genres, numeric cells) never produces one of
/// these; only structural preconditions and real I/O failures do.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: {0}")]
    InsufficientData(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
