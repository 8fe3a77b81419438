use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Settlement amount does not match the invoice")]
    AmountMismatch,

    #[error("Settlement project does not match the configured gateway")]
    GatewayProjectMismatch,

    #[error("Payment gateway is not configured")]
    GatewayNotConfigured,

    #[error("Gateway request failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidInput,
    NotFound,
    AmountMismatch,
    GatewayProjectMismatch,
    GatewayNotConfigured,
    UpstreamError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AmountMismatch => "AMOUNT_MISMATCH",
            ErrorCode::GatewayProjectMismatch => "GATEWAY_PROJECT_MISMATCH",
            ErrorCode::GatewayNotConfigured => "GATEWAY_NOT_CONFIGURED",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Database(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
