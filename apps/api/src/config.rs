use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::settings::{CompletionConfig, PipelineSettings};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout: Duration,
    pub optimizer_temperature: f32,
    pub execution_temperature: f32,
    pub execution_top_p: f32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: u64 = parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?;

        Ok(Config {
            gemini_api_key: require(&lookup, "GEMINI_API_KEY")?,
            gemini_model: lookup("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: lookup("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            llm_timeout: Duration::from_secs(timeout_secs),
            optimizer_temperature: parse_unit_range(&lookup, "OPTIMIZER_TEMPERATURE", 0.4, 2.0)?,
            execution_temperature: parse_unit_range(&lookup, "EXECUTION_TEMPERATURE", 0.7, 2.0)?,
            execution_top_p: parse_unit_range(&lookup, "EXECUTION_TOP_P", 0.9, 1.0)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The explicit per-stage completion settings handed to every pipeline run.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            optimizer: CompletionConfig::optimizer().with_temperature(self.optimizer_temperature),
            execution: CompletionConfig::execution()
                .with_temperature(self.execution_temperature)
                .with_top_p(self.execution_top_p),
        }
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn parse_unit_range<F>(lookup: &F, key: &str, default: f32, max: f32) -> Result<f32>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f32 = parse_or(lookup, key, default)?;
    if !(0.0..=max).contains(&value) {
        anyhow::bail!("{key} must be between 0 and {max}, got {value}");
    }
    Ok(value)
}
