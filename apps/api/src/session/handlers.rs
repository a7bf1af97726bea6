use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::autosave::SaveStatus;
use crate::documents::handlers::UserIdQuery;
use crate::editor::{Caret, EditorEffect};
use crate::errors::AppError;
use crate::session::commands::{dispatch, EditorCommand};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EditRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub commands: Vec<EditorCommand>,
}

#[derive(Serialize)]
pub struct EditResponse {
    /// The decorated editing surface.
    pub html: String,
    pub caret: Caret,
    pub effects: Vec<EditorEffect>,
    pub save_status: SaveStatus,
    /// User-facing status line, e.g. a failed upload.
    pub message: Option<String>,
}

/// POST /api/v1/documents/:id/edit
///
/// Applies the commands in order. The first failing command stops the batch;
/// commands before it stay applied.
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let session = state.sessions.open(req.user_id, id).await?;
    let mut session = session.lock().await;

    let mut effects = Vec::with_capacity(req.commands.len());
    for command in req.commands {
        let effect = dispatch(&mut session, &state.presets, command).await?;
        if effect != EditorEffect::None {
            effects.push(effect);
        }
    }

    let message = session.editor.status().map(str::to_string);
    session.editor.clear_status();
    Ok(Json(EditResponse {
        html: session.editor.to_editing_html(),
        caret: session.editor.caret(),
        effects,
        save_status: session.save_status(),
        message,
    }))
}

/// DELETE /api/v1/documents/:id/edit
/// Flushes pending autosaves and closes the session.
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> StatusCode {
    if state.sessions.close(params.user_id, id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
