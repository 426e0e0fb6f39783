use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::tokens::TokenService;
use crate::config::Config;
use crate::store::JobBoardStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Reads and writes of the access gate, apply workflow and job listing.
    pub store: Arc<dyn JobBoardStore>,
    pub tokens: Arc<TokenService>,
    pub config: Config,
}
