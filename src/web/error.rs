use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::dao::api_key::LedgerError;
use crate::llm_api::blackbox::UpstreamError;

/// Web层统一错误类型
///
/// 校验和认证类错误把具体原因返回给调用方；上游和存储类错误只记录日志，
/// 对外一律是笼统的内部错误，避免泄露后端细节。
#[derive(Debug)]
pub enum ApiError {
    /// 凭证缺失或无效
    Unauthorized { message: String },
    /// 额度耗尽
    QuotaExceeded { days_remaining: i64 },
    /// 请求体不合法
    Validation { message: String },
    /// 资源不存在或不属于调用方
    NotFound { message: String },
    /// 上游聊天服务调用失败
    Upstream { source: UpstreamError },
    /// 持久层失败
    Storage { source: sqlx::Error },
    /// 其他内部错误
    Internal { message: String },
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal { message: message.into() }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            ApiError::QuotaExceeded { days_remaining } => {
                write!(f, "Quota exceeded, resets in {} days", days_remaining)
            }
            ApiError::Validation { message } => write!(f, "Validation error: {}", message),
            ApiError::NotFound { message } => write!(f, "Not found: {}", message),
            ApiError::Upstream { source } => write!(f, "Upstream error: {}", source),
            ApiError::Storage { source } => write!(f, "Storage error: {}", source),
            ApiError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::Storage { source: error }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(error: UpstreamError) -> Self {
        ApiError::Upstream { source: error }
    }
}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unauthorized => ApiError::unauthorized("Invalid API key"),
            LedgerError::QuotaExceeded { days_remaining } => {
                ApiError::QuotaExceeded { days_remaining }
            }
            LedgerError::Storage { source } => ApiError::Storage { source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            ApiError::QuotaExceeded { days_remaining } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!(
                    "Credit limit exceeded. Credits will reset in {} days.",
                    days_remaining
                ),
            ),
            ApiError::Validation { message } => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            ApiError::Upstream { source } => {
                error!(error = %source, "Upstream chat service call failed");
                let message = match source {
                    UpstreamError::RateLimited => {
                        "The AI service rate limit was exceeded. Please try again later.".to_string()
                    }
                    UpstreamError::ServerError { .. } => {
                        "The AI service is experiencing issues. Please try again later.".to_string()
                    }
                    _ => "Internal server error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::Storage { source } => {
                error!(error = %source, "Database operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::Internal { message } => {
                error!(message = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
