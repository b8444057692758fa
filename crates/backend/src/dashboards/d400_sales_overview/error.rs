use axum::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors of the sales overview pipeline
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unexpected value in column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("export failed: {0}")]
    Export(String),
}

impl DashboardError {
    pub fn decode(column: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Status returned by the HTTP handlers
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}
