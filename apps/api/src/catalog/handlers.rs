use axum::{
    extract::{Query, State},
    Json,
};

use crate::catalog::{templates, Preset, Template};
use crate::documents::handlers::UserIdQuery;
use crate::state::AppState;

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<&'static [Template]> {
    Json(templates())
}

/// GET /api/v1/presets
pub async fn handle_list_presets(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Json<Vec<Preset>> {
    let presets: Vec<Preset> = state
        .presets
        .lock()
        .await
        .list_for(params.user_id)
        .cloned()
        .collect();
    Json(presets)
}
