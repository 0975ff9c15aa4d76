use std::sync::Arc;

use crate::config::Config;
use crate::db::ResultStore;
use crate::pipeline::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Holds the generation client; cloned into every background run.
    pub orchestrator: Orchestrator,
    /// Postgres when `DATABASE_URL` is set, otherwise a store that refuses every call.
    pub store: Arc<dyn ResultStore>,
}
