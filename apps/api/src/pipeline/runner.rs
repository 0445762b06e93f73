//! Pipeline orchestration.
//!
//! Flow: validate → optimize → substitute → execute.
//! Each stage waits on the previous one; there is no retry at this layer.
//! An optimizer failure degrades to the raw template and is reported as a warning;
//! an execution failure fails the run.

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::catalog::roles::is_known_role;
use crate::errors::AppError;
use crate::llm_client::settings::PipelineSettings;
use crate::llm_client::Completion;
use crate::models::prompt::{FilledBody, PromptRequest};
use crate::pipeline::executor::execute;
use crate::pipeline::optimizer::optimize;
use crate::pipeline::placeholders::substitute;
use crate::pipeline::validation::validate_request;

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub result: String,
    /// Non-fatal notices, e.g. the optimizer was bypassed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Runs the full customization pipeline for one request.
pub async fn run(
    completion: &dyn Completion,
    settings: &PipelineSettings,
    request: PromptRequest,
) -> Result<PipelineOutput, AppError> {
    let request = validate_request(&request)?;
    let run_id = Uuid::new_v4();

    async move {
        let role = request.role.as_deref();
        info!(
            role = role.unwrap_or("<none>"),
            known_role = role.map(is_known_role).unwrap_or(false),
            variables = request.variables.len(),
            "Starting prompt pipeline"
        );

        // Step 1: Optimize the raw template (degrades to the raw template on failure)
        let optimization = optimize(completion, &settings.optimizer, &request.template, role).await;

        // Step 2: Fill variables into the refined (or fallback) body
        let filled = FilledBody {
            body: substitute(&optimization.refined.body, &request.variables),
        };

        // Step 3: Execute with the role header
        let execution = execute(completion, &settings.execution, &filled, role).await?;

        info!("Prompt pipeline finished");

        Ok(PipelineOutput {
            result: execution.text,
            warnings: optimization
                .degraded
                .map(|reason| vec![reason.to_string()])
                .unwrap_or_default(),
        })
    }
    .instrument(info_span!("pipeline_run", %run_id))
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::llm_client::mock::{Reply, ScriptedCompletion};

    fn request(template: &str, vars: &[(&str, &str)], role: Option<&str>) -> PromptRequest {
        let variables: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PromptRequest {
            prompt_template: template.to_string(),
            variables: Some(variables),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_refined_template_is_filled_and_executed_with_role() {
        let completion = ScriptedCompletion::new(vec![
            Reply::Text("Explain {{topic}} for a beginner."),
            Reply::Text("Volcanoes are openings in the crust..."),
        ]);

        let output = run(
            &completion,
            &PipelineSettings::default(),
            request("tell me about {{topic}}", &[("topic", "volcanoes")], Some("Teacher")),
        )
        .await
        .unwrap();

        let prompts = completion.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1], "Act as a Teacher.\n\nExplain volcanoes for a beginner.");
        assert_eq!(output.result, "Volcanoes are openings in the crust...");
        assert!(output.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_empty_optimizer_reply_falls_back_to_raw_template() {
        let completion = ScriptedCompletion::new(vec![Reply::Empty, Reply::Text("Lava facts")]);

        let output = run(
            &completion,
            &PipelineSettings::default(),
            request("tell me about {{topic}}", &[("topic", "volcanoes")], Some("Teacher")),
        )
        .await
        .unwrap();

        let prompts = completion.prompts();
        assert_eq!(prompts[1], "Act as a Teacher.\n\ntell me about volcanoes");
        assert_eq!(output.result, "Lava facts");
        assert_eq!(output.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_execution_reply_fails_run() {
        let completion = ScriptedCompletion::new(vec![
            Reply::Text("Explain {{topic}} for a beginner."),
            Reply::Empty,
        ]);

        let result = run(
            &completion,
            &PipelineSettings::default(),
            request("tell me about {{topic}}", &[("topic", "volcanoes")], None),
        )
        .await;

        match result {
            Err(AppError::CompletionUnavailable) => {}
            other => panic!("expected CompletionUnavailable, got {other:?}"),
        }
        assert_eq!(completion.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_role_sends_filled_body_without_prefix() {
        let completion = ScriptedCompletion::new(vec![
            Reply::Text("Explain {{topic}} for a beginner."),
            Reply::Text("ok"),
        ]);

        run(
            &completion,
            &PipelineSettings::default(),
            request("tell me about {{topic}}", &[("topic", "volcanoes")], None),
        )
        .await
        .unwrap();

        let prompts = completion.prompts();
        assert_eq!(prompts[1], "Explain volcanoes for a beginner.");
        assert!(prompts[0].contains("\"Helpful Assistant\""));
    }

    #[tokio::test]
    async fn test_unsupplied_placeholders_reach_executor_untouched() {
        let completion = ScriptedCompletion::new(vec![
            Reply::Text("Describe {{topic}} using {{style}}."),
            Reply::Text("ok"),
        ]);

        run(
            &completion,
            &PipelineSettings::default(),
            request("describe {{topic}} in {{style}}", &[("topic", "rain")], None),
        )
        .await
        .unwrap();

        assert_eq!(completion.prompts()[1], "Describe rain using {{style}}.");
    }

    #[tokio::test]
    async fn test_each_stage_uses_its_own_config() {
        let completion = ScriptedCompletion::new(vec![
            Reply::Text("Explain {{topic}}."),
            Reply::Text("ok"),
        ]);
        let settings = PipelineSettings::default();

        run(
            &completion,
            &settings,
            request("tell me about {{topic}}", &[("topic", "tides")], None),
        )
        .await
        .unwrap();

        let calls = completion.calls();
        assert_eq!(calls[0].config, settings.optimizer);
        assert_eq!(calls[1].config, settings.execution);
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let completion = ScriptedCompletion::new(vec![]);

        let result = run(
            &completion,
            &PipelineSettings::default(),
            request("short", &[], None),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(completion.calls().is_empty());
    }
}
