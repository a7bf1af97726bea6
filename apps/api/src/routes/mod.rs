pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::assist::handlers as assist;
use crate::catalog::handlers as catalog;
use crate::company::handlers as company;
use crate::documents::handlers as documents;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Folders
        .route(
            "/api/v1/folders",
            get(documents::handle_list_folders).post(documents::handle_create_folder),
        )
        .route(
            "/api/v1/folders/:id",
            patch(documents::handle_rename_folder).delete(documents::handle_delete_folder),
        )
        // Documents
        .route(
            "/api/v1/documents",
            get(documents::handle_list_documents).post(documents::handle_create_document),
        )
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        .route("/api/v1/documents/:id/folder", patch(documents::handle_move_document))
        .route("/api/v1/documents/:id/title", patch(documents::handle_update_title))
        .route("/api/v1/documents/:id/content", put(documents::handle_update_content))
        .route(
            "/api/v1/documents/:id/metadata",
            patch(documents::handle_update_metadata),
        )
        .route("/api/v1/documents/:id/preview", get(documents::handle_preview))
        .route(
            "/api/v1/documents/:id/export/json",
            get(documents::handle_export_json),
        )
        .route(
            "/api/v1/documents/:id/export/pdf",
            get(documents::handle_export_pdf),
        )
        // Editing sessions
        .route(
            "/api/v1/documents/:id/edit",
            post(session::handle_edit).delete(session::handle_close_session),
        )
        // Catalog, AI and company lookups
        .route("/api/v1/templates", get(catalog::handle_list_templates))
        .route("/api/v1/presets", get(catalog::handle_list_presets))
        .route("/api/v1/assist/rewrite", post(assist::handle_rewrite))
        .route(
            "/api/v1/companies/:name/brief",
            get(company::handle_company_brief),
        )
        .route("/api/v1/salary", get(company::handle_salary))
        .with_state(state)
}
