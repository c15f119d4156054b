//! HTTP layer for the maintenance lookup service.

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use services::services::ai_lookup::AiMaintenanceLookup;
use tower_http::trace::TraceLayer;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    ai: Option<AiMaintenanceLookup>,
}

impl AppState {
    pub fn new(db: DBService, ai: Option<AiMaintenanceLookup>) -> Self {
        Self { db, ai }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn ai(&self) -> Option<&AiMaintenanceLookup> {
        self.ai.as_ref()
    }
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
