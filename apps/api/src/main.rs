mod assist;
mod autosave;
mod catalog;
mod company;
mod config;
mod db;
mod documents;
mod editor;
mod errors;
mod layout;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assist::LlmRewriter;
use crate::autosave::AutosaveConfig;
use crate::catalog::PresetLibrary;
use crate::company::{CompanyLookup, HttpCompanySource, SystemClock};
use crate::config::Config;
use crate::db::create_pool;
use crate::documents::PgDocumentStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgDocumentStore::new(db.clone()));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize company lookups
    let source = HttpCompanySource::new(&config.company_api_url)?;
    let companies = CompanyLookup::new(
        Arc::new(source),
        Arc::new(SystemClock),
        config.company_cache_ttl,
        config.company_quota_cooldown,
    );
    info!(
        "Company lookup initialized (ttl {}s, quota cooldown {}s)",
        config.company_cache_ttl.as_secs(),
        config.company_quota_cooldown.as_secs()
    );

    let presets = PresetLibrary::open(&config.preset_store_path)?;

    let autosave = AutosaveConfig {
        quiet_period: config.autosave_debounce,
        ..AutosaveConfig::default()
    };
    info!("Autosave debounce: {}ms", autosave.quiet_period.as_millis());

    let sessions = Arc::new(SessionRegistry::new(store.clone(), autosave));
    sessions.spawn_sweeper(config.session_idle_timeout);
    info!(
        "Idle editing sessions close after {}s",
        config.session_idle_timeout.as_secs()
    );

    // Build app state
    let state = AppState {
        db,
        store,
        sessions,
        presets: Arc::new(Mutex::new(presets)),
        rewriter: Arc::new(LlmRewriter::new(llm)),
        companies: Arc::new(companies),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
