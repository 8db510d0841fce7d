use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create schema: {0}")]
    Schema(String),

    #[error("invalid request body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("note not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    /// A mutating statement changed a number of rows other than one.
    #[error("expected one affected row, got {0}")]
    RowsAffected(usize),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::RowsAffected(_) | Self::Timestamp(_)
        )
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Schema(_)
            | Self::Database(_)
            | Self::RowsAffected(_)
            | Self::Timestamp(_)
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
