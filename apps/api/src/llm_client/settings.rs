//! Per-call generation settings passed explicitly to the completion collaborator.

use serde::{Deserialize, Serialize};

/// Gemini harm categories that the service configures thresholds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHateSpeech,
    HarmCategoryDangerousContent,
    HarmCategoryHarassment,
    HarmCategorySexuallyExplicit,
}

/// Blocking level applied to a harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Sampling and safety configuration for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub safety_settings: Vec<SafetySetting>,
}

impl CompletionConfig {
    /// Optimizer call: low temperature for consistent rewrites, provider default top-p.
    pub fn optimizer() -> Self {
        Self {
            temperature: 0.4,
            top_p: None,
            safety_settings: default_safety_settings(),
        }
    }

    /// Final execution call.
    pub fn execution() -> Self {
        Self {
            temperature: 0.7,
            top_p: Some(0.9),
            safety_settings: default_safety_settings(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Settings for both collaborator calls of a pipeline run. Built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub optimizer: CompletionConfig,
    pub execution: CompletionConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            optimizer: CompletionConfig::optimizer(),
            execution: CompletionConfig::execution(),
        }
    }
}

pub fn default_safety_settings() -> Vec<SafetySetting> {
    vec![
        SafetySetting {
            category: HarmCategory::HarmCategoryHateSpeech,
            threshold: HarmBlockThreshold::BlockOnlyHigh,
        },
        SafetySetting {
            category: HarmCategory::HarmCategoryDangerousContent,
            threshold: HarmBlockThreshold::BlockNone,
        },
        SafetySetting {
            category: HarmCategory::HarmCategoryHarassment,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        },
        SafetySetting {
            category: HarmCategory::HarmCategorySexuallyExplicit,
            threshold: HarmBlockThreshold::BlockLowAndAbove,
        },
    ]
}
