use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assist::AI_FAILED_MESSAGE;
use crate::catalog::CatalogError;
use crate::company::salary::SalaryError;
use crate::company::LookupError;
use crate::documents::StoreError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Temporarily unavailable, retry after {retry_after_secs}s")]
    Unavailable { retry_after_secs: u64 },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Not implemented")]
    NotImplemented,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    AI_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Unavailable { retry_after_secs } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "COOLING_DOWN",
                format!("요청이 많습니다. {retry_after_secs}초 후 다시 시도해주세요."),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "외부 서비스 요청에 실패했습니다.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::NotImplemented => (
                StatusCode::NOT_IMPLEMENTED,
                "NOT_IMPLEMENTED",
                "This endpoint is not yet implemented".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Module error conversions
// ────────────────────────────────────────────────────────────────────────────

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound("문서를 찾을 수 없습니다.".to_string()),
            StoreError::FolderNotFound(_) => {
                AppError::NotFound("폴더를 찾을 수 없습니다.".to_string())
            }
            StoreError::NameConflict(name) => {
                AppError::Conflict(format!("'{name}' 이름을 사용할 수 없습니다. 다시 시도해주세요."))
            }
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::EmptySelection => AppError::Validation(e.to_string()),
            CatalogError::TemplateNotFound(_) => {
                AppError::NotFound("템플릿을 찾을 수 없습니다.".to_string())
            }
            CatalogError::PresetNotFound(_) => {
                AppError::NotFound("프리셋을 찾을 수 없습니다.".to_string())
            }
            CatalogError::Io(_) | CatalogError::Json(_) => AppError::Internal(e.into()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::EmptyName => AppError::Validation(e.to_string()),
            LookupError::CoolingDown { retry_after } => AppError::Unavailable {
                retry_after_secs: retry_after.as_secs().max(1),
            },
            LookupError::NotFound(_) => {
                AppError::NotFound("회사 정보를 찾을 수 없습니다.".to_string())
            }
            LookupError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

impl From<SalaryError> for AppError {
    fn from(e: SalaryError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Editor(e) => AppError::UnprocessableEntity(e.to_string()),
            SessionError::Catalog(e) => e.into(),
            SessionError::Store(e) => e.into(),
            SessionError::Closed(e) => AppError::Conflict(e.to_string()),
        }
    }
}
