//! Template optimizer. Asks the collaborator to rewrite a raw template into a
//! stronger prompt body while keeping every `{{name}}` placeholder.
//!
//! Best effort: any failure degrades to the raw template instead of failing the run.

use std::fmt;

use tracing::{info, warn};

use crate::llm_client::settings::CompletionConfig;
use crate::llm_client::{strip_code_fences, Completion};
use crate::models::prompt::RefinedTemplate;
use crate::pipeline::placeholders::missing_placeholders;
use crate::pipeline::prompts::build_optimizer_prompt;

/// Why the optimizer output was discarded in favour of the raw template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// The collaborator answered with no text.
    EmptyResponse,
    /// The collaborator call itself failed. The cause is logged, never returned to clients.
    CallFailed,
    /// The rewrite dropped or renamed placeholders.
    PlaceholdersDropped { missing: Vec<String> },
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::EmptyResponse => write!(
                f,
                "Prompt optimizer did not return a refined body; the original template was used."
            ),
            DegradeReason::CallFailed => write!(
                f,
                "Prompt optimizer call failed; the original template was used."
            ),
            DegradeReason::PlaceholdersDropped { missing } => write!(
                f,
                "Prompt optimizer dropped placeholders ({}); the original template was used.",
                missing.join(", ")
            ),
        }
    }
}

/// Stage 1 output: the template to fill, plus the reason it is the raw one if degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimization {
    pub refined: RefinedTemplate,
    pub degraded: Option<DegradeReason>,
}

pub async fn optimize(
    completion: &dyn Completion,
    config: &CompletionConfig,
    raw_template: &str,
    role: Option<&str>,
) -> Optimization {
    let prompt = build_optimizer_prompt(raw_template, role);

    let reason = match completion.complete(&prompt, config).await {
        Ok(Some(reply)) => {
            let body = clean_reply(&reply);
            if body.is_empty() {
                DegradeReason::EmptyResponse
            } else {
                let missing = missing_placeholders(raw_template, body);
                if missing.is_empty() {
                    info!(
                        "Optimizer refined template ({} -> {} chars)",
                        raw_template.len(),
                        body.len()
                    );
                    return Optimization {
                        refined: RefinedTemplate {
                            body: body.to_string(),
                        },
                        degraded: None,
                    };
                }
                DegradeReason::PlaceholdersDropped { missing }
            }
        }
        Ok(None) => DegradeReason::EmptyResponse,
        Err(e) => {
            warn!("Optimizer call failed: {e}");
            DegradeReason::CallFailed
        }
    };

    warn!("{reason}");
    Optimization {
        refined: RefinedTemplate {
            body: raw_template.to_string(),
        },
        degraded: Some(reason),
    }
}

/// Removes a wrapping code fence and a single pair of wrapping double quotes.
fn clean_reply(reply: &str) -> &str {
    let body = strip_code_fences(reply);
    body.strip_prefix('"')
        .and_then(|b| b.strip_suffix('"'))
        .filter(|b| !b.contains('"'))
        .map(str::trim)
        .unwrap_or(body)
}
