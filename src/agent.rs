use crate::config::prompt::{ get_summary_prompt, PromptConfig };
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::fallback::fallback_reply;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, CompletionRequest };
use crate::llm::{ LlmConfig, LlmError };
use crate::models::chat::{ ChatMessage, ChatReply, Conversation, ModelList, Role, Summary };
use crate::quick_answers::{ detect_language, QuickAnswerGenerator, QuickAnswerSet };
use crate::selector::{ default_available_models, select_model_or };

use log::{ debug, error, info, warn };
use serde_json::Value as JsonValue;
use std::sync::Arc;

const SUMMARY_MAX_TOKENS: u32 = 800;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Handles chat, model listing and summarization. Holds no per-request state, so one instance
/// is shared by every connection.
pub struct RelayAgent {
    config: RelayConfig,
    chat_client: Option<Arc<dyn ChatClient>>,
    quick_answers: Option<QuickAnswerGenerator>,
    prompt_config: Arc<PromptConfig>,
}

impl RelayAgent {
    /// Builds the remote client when the credential allows it. A client that cannot be built
    /// leaves the agent in simulated mode, same as a missing key.
    pub fn new(config: RelayConfig, prompt_config: Arc<PromptConfig>) -> Self {
        let chat_client = match config.credential.key() {
            Some(key) => {
                let llm_config = LlmConfig {
                    api_key: Some(key.to_string()),
                    base_url: Some(config.base_url.clone()),
                    timeout: config.request_timeout,
                    max_retries: config.max_retries,
                };
                match new_chat_client(&llm_config) {
                    Ok(client) => {
                        info!(
                            "Chat client configured: BaseURL={}, DefaultModel={}",
                            client.get_base_url(),
                            config.default_model
                        );
                        Some(client)
                    }
                    Err(e) => {
                        warn!("Could not build chat client ({}); every reply will be simulated", e);
                        None
                    }
                }
            }
            None => {
                warn!("Chat client not configured; every reply will be simulated");
                None
            }
        };

        Self::with_client(config, prompt_config, chat_client)
    }

    pub fn with_client(
        config: RelayConfig,
        prompt_config: Arc<PromptConfig>,
        chat_client: Option<Arc<dyn ChatClient>>
    ) -> Self {
        let quick_answers = chat_client
            .as_ref()
            .map(|client| QuickAnswerGenerator::new(Arc::clone(client), Arc::clone(&prompt_config)));
        Self { config, chat_client, quick_answers, prompt_config }
    }

    pub fn is_simulated(&self) -> bool {
        self.chat_client.is_none()
    }

    pub async fn handle_chat(&self, body: &JsonValue) -> Result<ChatReply, RelayError> {
        let conversation = Conversation::from_json(body)?;
        let requested = conversation.model.as_deref().unwrap_or(&self.config.default_model);
        info!("Requested model: {}", requested);
        debug!("Processing user question: {}", conversation.last_user_text());

        let (client, generator) = match (&self.chat_client, &self.quick_answers) {
            (Some(client), Some(generator)) => (client, generator),
            _ => {
                info!("No usable API key, using fallback response");
                return Ok(self.fallback_reply(&conversation));
            }
        };

        match self.remote_reply(client.as_ref(), generator, &conversation, requested).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                log_upstream_failure(&e);
                Ok(self.fallback_reply(&conversation))
            }
        }
    }

    async fn remote_reply(
        &self,
        client: &dyn ChatClient,
        generator: &QuickAnswerGenerator,
        conversation: &Conversation,
        requested: &str
    ) -> Result<ChatReply, LlmError> {
        let model = self.resolve_model(client, requested).await;

        let request = CompletionRequest {
            model: model.clone(),
            messages: conversation.messages.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            json_output: false,
        };
        let response = client.complete(&request).await?;
        info!("OpenAI API response received successfully from {}", model);

        let quick_answers = generator.generate(&response.message.content, &model).await;
        Ok(ChatReply { message: response.message, quick_answers })
    }

    async fn resolve_model(&self, client: &dyn ChatClient, requested: &str) -> String {
        let available = self.available_models(client).await;
        let model = select_model_or(requested, &available, &self.config.default_model);
        if model != requested {
            info!("Model '{}' unavailable, using '{}'", requested, model);
        }
        model
    }

    async fn available_models(&self, client: &dyn ChatClient) -> Vec<String> {
        match client.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Could not fetch model list ({}), assuming default catalog", e);
                default_available_models()
            }
        }
    }

    fn fallback_reply(&self, conversation: &Conversation) -> ChatReply {
        let question = conversation.last_user_text();
        ChatReply {
            message: ChatMessage::assistant(fallback_reply(question)),
            quick_answers: QuickAnswerSet::defaults(detect_language(question)),
        }
    }

    pub async fn list_models(&self) -> ModelList {
        let simulated = ModelList {
            models: default_available_models(),
            simulated: Some(true),
        };
        let Some(client) = &self.chat_client else {
            return simulated;
        };

        match client.list_models().await {
            Ok(models) => {
                let mut models: Vec<String> = models
                    .into_iter()
                    .filter(|m| m.contains("gpt"))
                    .collect();
                models.sort();
                ModelList { models, simulated: None }
            }
            Err(e) => {
                error!("Error fetching models: {}", e);
                simulated
            }
        }
    }

    pub async fn summarize(&self, body: &JsonValue) -> Result<Summary, RelayError> {
        let conversation = Conversation::from_json(body)?;
        if conversation.messages.is_empty() {
            return Err(RelayError::InvalidInput("Nothing to summarize".to_string()));
        }

        let client = match &self.chat_client {
            Some(client) => client,
            None => {
                error!("Summary requested without a usable API key");
                return Err(
                    RelayError::UpstreamUnavailable(
                        "A valid OpenAI API key is required for summaries".to_string()
                    )
                );
            }
        };

        let model = self.resolve_model(client.as_ref(), &self.config.default_model).await;
        let request = CompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: Role::User,
                content: get_summary_prompt(&self.prompt_config, &conversation.transcript()),
            }],
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
            json_output: true,
        };

        let response = client.complete(&request).await.map_err(|e| {
            log_upstream_failure(&e);
            RelayError::Upstream(e.to_string())
        })?;

        parse_summary(&response.message.content)
    }
}

fn parse_summary(raw: &str) -> Result<Summary, RelayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RelayError::ParseFailure("empty summary".to_string()));
    }

    match serde_json::from_str::<Summary>(trimmed) {
        Ok(summary) => Ok(summary),
        Err(e) => {
            warn!("Summary was not valid JSON ({}), using raw text", e);
            Ok(Summary {
                summary: trimmed.to_string(),
                continuation_prompt: format!(
                    "Here is a summary of our previous conversation:\n\n{}\n\nLet's continue from here.",
                    trimmed
                ),
            })
        }
    }
}

fn log_upstream_failure(e: &LlmError) {
    match e {
        LlmError::Authentication { .. } => {
            error!("Authentication error - API key may be invalid: {}", e);
        }
        LlmError::RateLimited(_) => {
            error!("Rate limit exceeded - too many requests: {}", e);
        }
        _ => {
            error!("Error calling OpenAI API: {}", e);
        }
    }
}
