mod config;
mod db;
mod errors;
mod input;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema, DisabledStore, PgResultStore, ResultStore};
use crate::llm_client::LlmClient;
use crate::pipeline::orchestrator::Orchestrator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerCraft API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (optional)
    let store: Arc<dyn ResultStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgResultStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; workflow results will not be persisted");
            Arc::new(DisabledStore)
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let settings = config.pipeline_settings();
    info!(
        "Pipeline timeout {}s, heartbeat every {}s, {} section headers",
        settings.timeout.as_secs(),
        settings.heartbeat.as_secs(),
        settings.section_headers.len()
    );
    let orchestrator = Orchestrator::new(Arc::new(llm), settings);

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator,
        store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
