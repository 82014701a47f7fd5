use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input has no header row or no data rows")]
    EmptyInput,

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("label {0:?} is reserved for chart rows")]
    ReservedLabel(String),

    #[error("no metric columns found in header")]
    NoMetrics,

    #[error("unknown financial year: {0}")]
    UnknownYear(String),

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
