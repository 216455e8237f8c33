/*
 * Centralized application error type with structured JSON responses for the federated content search service.
 * I'm implementing a single error enum that every layer (database, cache, provider adapters, HTTP handlers) converts into, so the API surface always returns a consistent error envelope.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type.
/// I'm keeping one variant per failure domain so callers can match on category without string parsing.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("external provider error: {0}")]
    ExternalApiError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("not found: {0}")]
    NotFoundError(String),

    #[error("request timed out: {0}")]
    TimeoutError(String),

    #[error("internal server error: {0}")]
    InternalServerError(String),

    #[error("bad request: {0}")]
    BadRequestError(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailableError(String),
}

impl AppError {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFoundError(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequestError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalServerError(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CacheError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::RateLimitError(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFoundError(_) => StatusCode::NOT_FOUND,
            Self::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequestError(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailableError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DatabaseError(_) => ErrorCategory::Persistence,
            Self::CacheError(_) => ErrorCategory::Persistence,
            Self::ExternalApiError(_) => ErrorCategory::Upstream,
            Self::SerializationError(_) => ErrorCategory::Internal,
            Self::ConfigurationError(_) => ErrorCategory::Internal,
            Self::ValidationError(_) => ErrorCategory::Client,
            Self::RateLimitError(_) => ErrorCategory::Client,
            Self::NotFoundError(_) => ErrorCategory::Client,
            Self::TimeoutError(_) => ErrorCategory::Upstream,
            Self::InternalServerError(_) => ErrorCategory::Internal,
            Self::BadRequestError(_) => ErrorCategory::Client,
            Self::ServiceUnavailableError(_) => ErrorCategory::Upstream,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DatabaseError(_) | Self::InternalServerError(_) | Self::ConfigurationError(_) => {
                ErrorSeverity::Critical
            }
            Self::CacheError(_) | Self::ExternalApiError(_) | Self::ServiceUnavailableError(_) => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Info,
        }
    }

    /// True when retrying the same operation has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExternalApiError(_) | Self::TimeoutError(_) | Self::ServiceUnavailableError(_)
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationError(msg) | Self::BadRequestError(msg) => msg.clone(),
            Self::NotFoundError(msg) => msg.clone(),
            Self::RateLimitError(_) => "too many requests, slow down".to_string(),
            Self::TimeoutError(_) => "upstream took too long to respond".to_string(),
            Self::ServiceUnavailableError(_) => "service temporarily unavailable".to_string(),
            _ => "an internal error occurred".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::ConfigurationError(_) => "CONFIGURATION_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::RateLimitError(_) => "RATE_LIMIT_EXCEEDED",
            Self::NotFoundError(_) => "NOT_FOUND",
            Self::TimeoutError(_) => "TIMEOUT",
            Self::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            Self::BadRequestError(_) => "BAD_REQUEST",
            Self::ServiceUnavailableError(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn log_error(&self) {
        match self.severity() {
            ErrorSeverity::Critical => error!("{} [{}]", self, self.error_code()),
            ErrorSeverity::Warning => tracing::warn!("{} [{}]", self, self.error_code()),
            ErrorSeverity::Info => tracing::debug!("{} [{}]", self, self.error_code()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorCategory {
    Client,
    Upstream,
    Persistence,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
    pub support_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub retryable: bool,
    pub context: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log_error();

        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message: self.user_message(),
                category: self.category(),
                severity: self.severity(),
                retryable: self.is_retryable(),
                context: None,
            },
            timestamp: Utc::now(),
            request_id: None,
            support_message: matches!(self.severity(), ErrorSeverity::Critical)
                .then(|| "if this persists, contact support".to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFoundError("record not found".to_string()),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else {
            Self::ExternalApiError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        Self::CacheError(err.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        Self::ExternalApiError(format!("xml decode failed: {}", err))
    }
}

/// Extra context attachable to a `Result` error path, mirroring the teacher's `error_context!` helper.
pub trait ErrorContext<T> {
    fn context_msg(self, msg: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn context_msg(self, msg: &str) -> Result<T> {
        self.map_err(|e| AppError::InternalServerError(format!("{}: {}", msg, e)))
    }
}

pub trait ResultExt<T> {
    fn or_not_found(self, what: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Option<T> {
    fn or_not_found(self, what: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFoundError(what.to_string()))
    }
}

#[macro_export]
macro_rules! error_context {
    ($result:expr, $msg:expr) => {
        $crate::utils::error::ErrorContext::context_msg($result, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_correctly() {
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::RateLimitError("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::database("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(AppError::TimeoutError("x".into()).is_retryable());
        assert!(!AppError::ValidationError("x".into()).is_retryable());
    }

    #[test]
    fn sqlx_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
