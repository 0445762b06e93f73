pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt pipeline
        .route("/api/v1/prompts/customize", post(pipeline::handle_customize))
        .route("/api/v1/prompts/optimize", post(pipeline::handle_optimize))
        .route("/api/v1/prompts/preview", post(pipeline::handle_preview))
        .route("/api/v1/prompts/run", post(pipeline::handle_run))
        // Catalog
        .route("/api/v1/roles", get(catalog::handle_list_roles))
        .route("/api/v1/presets", get(catalog::handle_list_presets))
        .route("/api/v1/presets/:slug", get(catalog::handle_get_preset))
        .with_state(state)
}
