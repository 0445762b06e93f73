//! Axum route handlers for the prompt pipeline.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::prompt::{FilledBody, PromptRequest};
use crate::pipeline::executor::{compose_final_prompt, execute_direct, DirectRun};
use crate::pipeline::optimizer::optimize;
use crate::pipeline::placeholders::{placeholder_names, substitute, unresolved_placeholders};
use crate::pipeline::runner::{run, PipelineOutput};
use crate::pipeline::validation::{
    normalize_role, validate_prompt, validate_request, validate_template,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(alias = "promptTemplate")]
    pub prompt_template: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub refined_template: String,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub filled_template: String,
    pub final_prompt: String,
    pub placeholders: Vec<String>,
    pub unresolved: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompts/customize
///
/// Full pipeline: optimize → substitute → execute.
pub async fn handle_customize(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<PipelineOutput>, AppError> {
    let output = run(state.completion.as_ref(), &state.settings, request).await?;
    Ok(Json(output))
}

/// POST /api/v1/prompts/optimize
///
/// Optimizer stage only. Never fails on collaborator problems; reports degradation instead.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let template = validate_template(&request.prompt_template)?;
    let role = normalize_role(request.role.as_deref())?;

    let optimization = optimize(
        state.completion.as_ref(),
        &state.settings.optimizer,
        &template,
        role.as_deref(),
    )
    .await;

    Ok(Json(OptimizeResponse {
        refined_template: optimization.refined.body,
        degraded: optimization.degraded.is_some(),
        warning: optimization.degraded.map(|reason| reason.to_string()),
    }))
}

/// POST /api/v1/prompts/preview
///
/// Local substitution on the raw template, no LLM call.
/// Shows what the executor would receive if the optimizer were bypassed.
pub async fn handle_preview(
    Json(request): Json<PromptRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let request = validate_request(&request)?;

    let filled = FilledBody {
        body: substitute(&request.template, &request.variables),
    };
    let final_prompt = compose_final_prompt(&filled, request.role.as_deref());

    Ok(Json(PreviewResponse {
        placeholders: placeholder_names(&request.template).into_iter().collect(),
        unresolved: unresolved_placeholders(&request.template, &request.variables),
        filled_template: filled.body,
        final_prompt,
    }))
}

/// POST /api/v1/prompts/run
///
/// Sends a finished prompt straight to the execution call and reports token usage.
pub async fn handle_run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<DirectRun>, AppError> {
    let prompt = validate_prompt(&request.prompt)?;
    let run = execute_direct(state.completion.as_ref(), &state.settings.execution, &prompt).await?;
    Ok(Json(run))
}
