use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::GenerativeBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable generation backend. Production wires in `OpenRouterClient`;
    /// tests substitute a canned implementation.
    pub llm: Arc<dyn GenerativeBackend>,
    pub config: Config,
}
