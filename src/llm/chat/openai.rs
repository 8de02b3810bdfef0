use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{
    Client as HttpClient,
    RequestBuilder,
    header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION, USER_AGENT },
};
use serde::{ de::DeserializeOwned, Deserialize, Serialize };
use std::time::Duration;
use tokio::time::sleep;

use super::{ ChatClient, CompletionRequest, CompletionResponse };
use crate::llm::{ LlmConfig, LlmError };
use crate::models::chat::ChatMessage;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

pub struct OpenAIChatClient {
    http: HttpClient,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct OpenAIModelList {
    data: Vec<OpenAIModel>,
}

#[derive(Deserialize)]
struct OpenAIModel {
    id: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
        max_retries: u32
    ) -> Result<Self, LlmError> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("chat-relay/", env!("CARGO_PKG_VERSION")))
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| LlmError::Config(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            max_retries,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingCredential)?;

        Self::new(api_key, config.base_url.clone(), config.timeout, config.max_retries)
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    async fn send_once<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, LlmError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), message));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| LlmError::Malformed(e.to_string()))
    }

    /// Sends the request built by `build`, retrying transient failures with exponential backoff.
    async fn send_with_retry<T, F>(&self, build: F) -> Result<T, LlmError>
        where T: DeserializeOwned, F: Fn() -> RequestBuilder
    {
        let mut attempt = 0;
        let mut delay = self.initial_backoff;
        loop {
            match self.send_once(build()).await {
                Ok(value) => {
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "OpenAI request failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let list: OpenAIModelList = self.send_with_retry(|| self.http.get(&url)).await?;
        debug!("OpenAI reported {} models", list.data.len());
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let req = OpenAIChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let resp: OpenAIResponse = self.send_with_retry(|| self.http.post(&url).json(&req)).await?;

        let message = resp.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?.message;

        Ok(CompletionResponse { message })
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
