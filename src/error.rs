use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::ErrorKind;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Required field empty or identifier malformed; raised before any store access
    Validation(String),
    NotFound(String),
    CategoryNotFound(i64),
    /// Foreign-key, uniqueness, check or not-null failure reported by the store
    ConstraintViolation(String),
    DatabaseError(String),
    StoreUnavailable(String),
    TimeoutError(String),
    ConfigurationError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::CategoryNotFound(id) => write!(f, "Category {} does not exist", id),
            AppError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            AppError::TimeoutError(msg) => write!(f, "Timeout error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CategoryNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TimeoutError(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::DatabaseError(_)
            | AppError::ConfigurationError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::DatabaseError(_)
            | AppError::ConfigurationError(_)
            | AppError::Internal(_) => {
                tracing::error!("{}", self);
                "Internal server error".to_string()
            }
            AppError::StoreUnavailable(_) | AppError::TimeoutError(_) => {
                tracing::warn!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) if is_busy(db_err.code().as_deref()) => {
                AppError::StoreUnavailable(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    AppError::ConstraintViolation(db_err.message().to_string())
                }
                _ => AppError::DatabaseError(db_err.to_string()),
            },
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                AppError::StoreUnavailable(e.to_string())
            }
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

// SQLITE_BUSY, SQLITE_LOCKED and their extended codes
fn is_busy(code: Option<&str>) -> bool {
    matches!(code, Some("5" | "6" | "261" | "262" | "517" | "773"))
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::CategoryNotFound(7).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::ConstraintViolation("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::StoreUnavailable("x".into()).status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AppError::DatabaseError("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_sqlx_error_classification() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
        assert!(matches!(AppError::from(sqlx::Error::PoolTimedOut), AppError::StoreUnavailable(_)));
        assert!(matches!(AppError::from(sqlx::Error::PoolClosed), AppError::StoreUnavailable(_)));
    }

    #[test]
    fn test_busy_codes() {
        assert!(is_busy(Some("5")));
        assert!(is_busy(Some("517")));
        assert!(!is_busy(Some("787")));
        assert!(!is_busy(None));
    }

    #[test]
    fn test_category_not_found_message() {
        assert_eq!(AppError::CategoryNotFound(42).to_string(), "Category 42 does not exist");
    }
}
