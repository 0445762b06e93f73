//! Prompt executor: the final collaborator call with the role header applied.

use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::settings::CompletionConfig;
use crate::llm_client::{Completion, TokenUsage};
use crate::models::prompt::{ExecutionResult, FilledBody};
use crate::pipeline::prompts::role_header;

/// Prepends `Act as a {role}.` followed by a blank line when a role is present.
pub fn compose_final_prompt(filled: &FilledBody, role: Option<&str>) -> String {
    match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!("{}{}", role_header(role), filled.body),
        None => filled.body.clone(),
    }
}

/// Sends the composed prompt. No usable reply is fatal for the run.
pub async fn execute(
    completion: &dyn Completion,
    config: &CompletionConfig,
    filled: &FilledBody,
    role: Option<&str>,
) -> Result<ExecutionResult, AppError> {
    let prompt = compose_final_prompt(filled, role);

    match completion.complete(&prompt, config).await {
        Ok(Some(text)) if !text.trim().is_empty() => {
            info!("Execution call returned {} chars", text.len());
            Ok(ExecutionResult { text })
        }
        Ok(_) => {
            error!("Execution call returned no usable output");
            Err(AppError::CompletionUnavailable)
        }
        Err(e) => {
            error!("Execution call failed: {e}");
            Err(AppError::CompletionUnavailable)
        }
    }
}

/// Reply to a prompt run as-is, with token counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectRun {
    pub response: String,
    pub usage: TokenUsage,
    /// True when the provider reported no counts and they were estimated from length.
    pub usage_estimated: bool,
}

/// Runs a caller-written prompt with no optimizer pass and no role header.
pub async fn execute_direct(
    completion: &dyn Completion,
    config: &CompletionConfig,
    prompt: &str,
) -> Result<DirectRun, AppError> {
    let metered = match completion.complete_metered(prompt, config).await {
        Ok(metered) => metered,
        Err(e) => {
            error!("Direct run failed: {e}");
            return Err(AppError::CompletionUnavailable);
        }
    };

    let Some(response) = metered.text.filter(|t| !t.trim().is_empty()) else {
        error!("Direct run returned no usable output");
        return Err(AppError::CompletionUnavailable);
    };

    let (usage, usage_estimated) = match metered.usage {
        Some(usage) => (usage, false),
        None => (estimate_usage(prompt, &response), true),
    };
    info!(
        "Direct run returned {} chars ({} tokens)",
        response.len(),
        usage.total_tokens
    );

    Ok(DirectRun {
        response,
        usage,
        usage_estimated,
    })
}

/// Roughly four characters per token.
fn estimate_usage(prompt: &str, response: &str) -> TokenUsage {
    let tokens = |text: &str| (text.chars().count() as u32).div_ceil(4);
    let prompt_tokens = tokens(prompt);
    let completion_tokens = tokens(response);
    TokenUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    }
}
