pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use super::{ LlmConfig, LlmError };
use self::openai::OpenAIChatClient;
use crate::models::chat::ChatMessage;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the API for a JSON object instead of free text.
    pub json_output: bool,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub message: ChatMessage,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, LlmError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let specific_client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(specific_client))
}
