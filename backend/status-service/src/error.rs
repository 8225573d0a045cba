/// Error types for Status Service
///
/// Every failure of a remote procedure is surfaced to the caller as a typed error with
/// a stable `code` and a human readable `message`. Nothing is swallowed and nothing is
/// retried automatically.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

/// Result type for status-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed shape validation
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Caller has no valid session
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller exhausted the rate limit window
    #[error("Too many requests, retry in {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },

    /// A required upstream (identity provider, rate limiter) is unreachable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Internal invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wire-level error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "BAD_REQUEST",
            AppError::Unauthenticated(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show to clients. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Unauthenticated(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::TooManyRequests { retry_after_secs } => format!(
                "You are posting too fast, try again in {} seconds",
                retry_after_secs
            ),
            AppError::ServiceUnavailable(_) => "A required service is unavailable".to_string(),
            AppError::Database(_) => "Database operation failed".to_string(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Log with a level matching the error class.
    pub fn log(&self) {
        match self {
            AppError::Validation { .. } | AppError::NotFound(_) => {
                tracing::debug!(error = %self, "client error");
            }
            AppError::Unauthenticated(_) => {
                tracing::warn!(error = %self, "authentication failure");
            }
            AppError::TooManyRequests { .. } => {
                tracing::info!(error = %self, "rate limit hit");
            }
            AppError::ServiceUnavailable(_) => {
                tracing::warn!(error = %self, "dependency issue");
            }
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "server error");
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
    status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let status = self.status_code();
        let field = match self {
            AppError::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        };

        let mut builder = HttpResponse::build(status);
        if let AppError::TooManyRequests { retry_after_secs } = self {
            builder.insert_header(("Retry-After", retry_after_secs.to_string()));
        }

        builder.json(ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.public_message(),
                field,
            },
            status: status.as_u16(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::ServiceUnavailable(format!("rate limiter: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ServiceUnavailable(format!("identity provider: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first offending field; sorted so the choice is stable.
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, message)) => AppError::Validation { field, message },
            None => AppError::validation("input", "Invalid input"),
        }
    }
}
