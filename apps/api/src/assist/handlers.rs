use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assist::{RewriteOp, MAX_INPUT_CHARS};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RewriteRequest {
    pub op: RewriteOp,
    pub text: String,
}

#[derive(Serialize)]
pub struct RewriteResponse {
    pub text: String,
}

/// POST /api/v1/assist/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("선택된 내용이 없습니다.".to_string()));
    }
    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(AppError::Validation(format!(
            "한 번에 {MAX_INPUT_CHARS}자까지 처리할 수 있습니다."
        )));
    }
    let text = state
        .rewriter
        .rewrite(req.op, text)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(Json(RewriteResponse { text }))
}
