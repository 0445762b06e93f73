//! Scripted `Completion` used by pipeline and handler tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::settings::CompletionConfig;
use super::{Completion, LlmError, MeteredCompletion, TokenUsage};

/// One scripted reply.
pub enum Reply {
    Text(&'static str),
    /// Text together with provider-reported token counts.
    Metered(&'static str, TokenUsage),
    Empty,
    Fail,
    /// An upstream API error with the given status and raw body.
    Upstream(u16, &'static str),
}

/// A prompt received by the mock together with the config it was sent with.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub config: CompletionConfig,
}

/// Returns queued replies in order and records every prompt it receives.
/// Once the queue is exhausted every call yields `Ok(None)`.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<Option<String>, LlmError> {
        Ok(self.complete_metered(prompt, config).await?.text)
    }

    async fn complete_metered(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<MeteredCompletion, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            config: config.clone(),
        });
        let (text, usage) = match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => (Some(text.to_string()), None),
            Some(Reply::Metered(text, usage)) => (Some(text.to_string()), Some(usage)),
            Some(Reply::Empty) | None => (None, None),
            Some(Reply::Fail) => {
                return Err(LlmError::Api {
                    status: 503,
                    message: "scripted failure".to_string(),
                })
            }
            Some(Reply::Upstream(status, body)) => {
                return Err(LlmError::Api {
                    status,
                    message: body.to_string(),
                })
            }
        };
        Ok(MeteredCompletion { text, usage })
    }
}
