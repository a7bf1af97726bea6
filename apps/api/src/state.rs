use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::assist::Rewriter;
use crate::catalog::PresetLibrary;
use crate::company::CompanyLookup;
use crate::documents::DocumentStore;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Owner-scoped reads and writes of a single document.
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<SessionRegistry>,
    pub presets: Arc<Mutex<PresetLibrary>>,
    pub rewriter: Arc<dyn Rewriter>,
    pub companies: Arc<CompanyLookup>,
}
