// Prompt customization pipeline: optimize → substitute → execute.
// All LLM calls go through the `Completion` trait in llm_client.

pub mod executor;
pub mod handlers;
pub mod optimizer;
pub mod placeholders;
pub mod prompts;
pub mod runner;
pub mod validation;
