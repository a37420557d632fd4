use std::sync::Arc;

use anyhow::{Error, Result};

use super::models::Transcript;
use crate::ai::models::ModelRouter;
use crate::ai::prompt::persona_prompt;
use crate::core::AppConfig;
use crate::openai::{CompletionParams, Message, Role, completion, first_choice_content};

/// Forwards a single chat turn to an OpenAI compatible API.
///
/// Holds no conversation state between turns: each call gets the
/// prior history from the caller, prepends the persona prompt and
/// returns the assistant's reply.
pub struct Relay {
    api_url: String,
    api_key: String,
    default_persona: String,
    params: CompletionParams,
    models: Arc<dyn ModelRouter>,
}

impl Relay {
    pub fn new(config: &AppConfig, models: Arc<dyn ModelRouter>) -> Self {
        Self {
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone(),
            default_persona: config.system_message.clone(),
            params: CompletionParams::default(),
            models,
        }
    }

    pub fn upstream_model(&self, requested: &str) -> String {
        self.models.route(requested)
    }

    /// The messages that will be sent upstream for this turn.
    pub fn transcript(
        &self,
        message: Option<&str>,
        history: &[Message],
        personality: Option<&str>,
    ) -> Transcript {
        let persona = persona_prompt(personality, &self.default_persona);
        Transcript::for_turn(&persona, history, message)
    }

    /// Runs the next turn by passing the transcript to the LLM and
    /// returns the assistant message.
    pub async fn next_msg(
        &self,
        message: Option<&str>,
        history: &[Message],
        model: &str,
        personality: Option<&str>,
    ) -> Result<Message, Error> {
        let transcript = self.transcript(message, history, personality);
        let upstream_model = self.upstream_model(model);

        tracing::debug!(
            "Relaying turn with {} messages to model {}",
            transcript.messages().len(),
            upstream_model
        );

        let resp = completion(
            transcript.messages(),
            &self.api_url,
            &self.api_key,
            &upstream_model,
            &self.params,
        )
        .await?;
        let content = first_choice_content(&resp)?;

        Ok(Message::new(Role::Assistant, &content))
    }
}
