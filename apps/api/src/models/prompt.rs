use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One user submission. Consumed by a single pipeline run and then dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    #[serde(alias = "promptTemplate")]
    pub prompt_template: String,
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Optimizer output: a rewritten template whose placeholders are intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinedTemplate {
    pub body: String,
}

/// A refined template after substitution of every supplied variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilledBody {
    pub body: String,
}

/// Final reply of the execution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub text: String,
}
