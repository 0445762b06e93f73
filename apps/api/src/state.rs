use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::settings::PipelineSettings;
use crate::llm_client::Completion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion collaborator shared by every request. Stateless; safe for concurrent calls.
    pub completion: Arc<dyn Completion>,
    /// Per-stage generation settings, fixed at startup.
    pub settings: PipelineSettings,
    pub config: Config,
}
