use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{apply_template, find_template, CatalogError};
use crate::documents::naming::{normalize_name, DEFAULT_DOCUMENT_TITLE};
use crate::documents::repo::{self, NewDocument};
use crate::editor::placeholders::PlaceholderContext;
use crate::editor::sanitize::sanitize_html;
use crate::editor::{Document, Editor};
use crate::errors::AppError;
use crate::layout::{a4_geometry, paginate_html, render_preview, FontFamily, MetricMeasurer};
use crate::models::document::{ContentEnvelope, DocumentRow, FolderRow, MetaField};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Folders
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/folders
pub async fn handle_list_folders(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<FolderRow>>, AppError> {
    Ok(Json(repo::list_folders(&state.db, params.user_id).await?))
}

#[derive(Deserialize)]
pub struct CreateFolderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
}

/// POST /api/v1/folders
pub async fn handle_create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderRow>), AppError> {
    let folder =
        repo::create_folder(&state.db, req.user_id, req.parent_id, req.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

#[derive(Deserialize)]
pub struct RenameFolderRequest {
    pub user_id: Uuid,
    pub name: String,
}

/// PATCH /api/v1/folders/:id
pub async fn handle_rename_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<FolderRow>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("폴더 이름을 입력해주세요.".to_string()));
    }
    Ok(Json(repo::rename_folder(&state.db, req.user_id, id, &req.name).await?))
}

/// DELETE /api/v1/folders/:id
pub async fn handle_delete_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    repo::delete_folder(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListDocumentsQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    Ok(Json(
        repo::list_documents(&state.db, params.user_id, params.folder_id).await?,
    ))
}

#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Seeds the body from a catalog template.
    #[serde(default)]
    pub template_id: Option<String>,
}

/// POST /api/v1/documents
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let company = blank_to_none(req.company);
    let role = blank_to_none(req.role);

    let html = match req.template_id.as_deref() {
        Some(id) => {
            let template =
                find_template(id).ok_or_else(|| CatalogError::TemplateNotFound(id.to_string()))?;
            let mut editor = Editor::default();
            editor.set_context(PlaceholderContext {
                company: company.clone(),
                role: role.clone(),
            });
            apply_template(&mut editor, template);
            Some(editor.to_html())
        }
        None => None,
    };

    let doc = repo::create_document(
        &state.db,
        req.user_id,
        NewDocument {
            folder_id: req.folder_id,
            title: req.title.as_deref(),
            company: company.as_deref(),
            role: role.as_deref(),
            html: html.as_deref(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(doc))))
}

#[derive(Serialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: DocumentRow,
    /// The body flattened to HTML, ready for the editor.
    pub html: String,
}

impl From<DocumentRow> for DocumentResponse {
    fn from(document: DocumentRow) -> Self {
        let html = Document::from_value(&document.content).to_html();
        Self { document, html }
    }
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state.store.fetch(params.user_id, id).await?;
    Ok(Json(DocumentResponse::from(doc)))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.sessions.close(params.user_id, id).await;
    repo::delete_document(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct MoveDocumentRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// PATCH /api/v1/documents/:id/folder
pub async fn handle_move_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveDocumentRequest>,
) -> Result<StatusCode, AppError> {
    repo::move_document(&state.db, req.user_id, id, req.folder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UpdateTitleRequest {
    pub user_id: Uuid,
    pub title: String,
}

/// PATCH /api/v1/documents/:id/title
pub async fn handle_update_title(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTitleRequest>,
) -> Result<Json<Value>, AppError> {
    let title = normalize_name(Some(&req.title), DEFAULT_DOCUMENT_TITLE);
    state.sessions.close(req.user_id, id).await;
    state.store.update_title(req.user_id, id, &title).await?;
    Ok(Json(serde_json::json!({ "title": title })))
}

#[derive(Deserialize)]
pub struct UpdateContentRequest {
    pub user_id: Uuid,
    pub html: String,
}

/// PUT /api/v1/documents/:id/content
///
/// The body is sanitized and normalized through the block model, so the
/// stored HTML is always the canonical serialization. An open editing session
/// is flushed and closed first; the next edit reloads this body.
pub async fn handle_update_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<Value>, AppError> {
    let html = Document::from_nodes(sanitize_html(&req.html)).to_html();
    let content = ContentEnvelope::from_html(html.clone()).to_value();
    state.sessions.close(req.user_id, id).await;
    state.store.update_content(req.user_id, id, &content).await?;
    Ok(Json(serde_json::json!({ "html": html })))
}

#[derive(Deserialize)]
pub struct UpdateMetadataRequest {
    pub user_id: Uuid,
    pub field: MetaField,
    #[serde(default)]
    pub value: Option<String>,
}

/// PATCH /api/v1/documents/:id/metadata
pub async fn handle_update_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMetadataRequest>,
) -> Result<StatusCode, AppError> {
    let value = blank_to_none(req.value);
    state.sessions.close(req.user_id, id).await;
    state
        .store
        .update_metadata(req.user_id, id, req.field, value.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Preview and export
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub zoom: Option<f32>,
    #[serde(default)]
    pub font: Option<FontFamily>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub page_count: usize,
    pub zoom: f32,
    pub html: String,
}

/// GET /api/v1/documents/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let doc = state.store.fetch(params.user_id, id).await?;
    let html = Document::from_value(&doc.content).to_html();
    let geometry = a4_geometry(params.font.unwrap_or(FontFamily::Pretendard));
    let zoom = crate::layout::clamp_zoom(params.zoom.unwrap_or(1.0));

    // Measurement is CPU-bound; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || {
        let pages = paginate_html(&html, &MetricMeasurer, &geometry);
        PreviewResponse {
            page_count: pages.len(),
            zoom,
            html: render_preview(&pages, &geometry, zoom),
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("preview task failed: {e}")))?;
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct JsonExport {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub content: Value,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/v1/documents/:id/export/json
/// The content envelope exactly as stored.
pub async fn handle_export_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JsonExport>, AppError> {
    let doc = state.store.fetch(params.user_id, id).await?;
    Ok(Json(JsonExport {
        id: doc.id,
        title: doc.title,
        company: doc.company,
        role: doc.role,
        content: doc.content,
        updated_at: doc.updated_at,
    }))
}

/// GET /api/v1/documents/:id/export/pdf
/// PDF rendering belongs to an external renderer.
pub async fn handle_export_pdf() -> Result<(), AppError> {
    Err(AppError::NotImplemented)
}
