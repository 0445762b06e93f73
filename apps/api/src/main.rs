mod catalog;
mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
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

    info!("Starting Promptcraft API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the completion collaborator
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_api_base,
        &config.gemini_model,
        config.llm_timeout,
    )?;
    info!(
        "Gemini client initialized (model: {}, endpoint: {})",
        config.gemini_model,
        gemini.endpoint()
    );

    let settings = config.pipeline_settings();
    info!(
        "Pipeline settings: optimizer temperature={}, execution temperature={} top_p={:?}",
        settings.optimizer.temperature, settings.execution.temperature, settings.execution.top_p
    );

    // Build app state
    let state = AppState {
        completion: Arc::new(gemini),
        settings,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        // TODO: restrict origins once the web client has a fixed host
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
