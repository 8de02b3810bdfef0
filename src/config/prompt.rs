use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

const QUICK_ANSWERS_TEMPLATE: &str = "You suggest follow-up messages for a chat user. \
Read the assistant reply below and propose exactly three short follow-up questions or \
requests (at most six words each) the user might send next, written in the same language \
as the reply. Respond only with a JSON object of the form \
{\"suggestions\": [\"...\", \"...\", \"...\"]}.\n\nAssistant reply:\n{reply}";

const SUMMARY_TEMPLATE: &str = "Summarize the following conversation between a user and an \
assistant in a few sentences, keeping the facts, decisions and open questions. Then write a \
prompt the user could paste into a new chat to continue where they left off. Respond only with \
a JSON object of the form {\"summary\": \"...\", \"continuationPrompt\": \"...\"}.\n\n\
Conversation:\n{conversation}";

#[derive(Debug)]
pub enum PromptError {
    MissingPlaceholder(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::MissingPlaceholder(key) =>
                write!(f, "Prompt template is missing the '{}' placeholder", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Instruction templates sent to the remote API. Either field may be overridden from a JSON file.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub quick_answers: String,
    pub summary: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            quick_answers: QUICK_ANSWERS_TEMPLATE.to_string(),
            summary: SUMMARY_TEMPLATE.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.quick_answers.contains("{reply}") {
            return Err(PromptError::MissingPlaceholder("quick_answers:{reply}".to_string()));
        }
        if !self.summary.contains("{conversation}") {
            return Err(PromptError::MissingPlaceholder("summary:{conversation}".to_string()));
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(Arc::new(config))
}

pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(path) => {
            let file_content = fs::read_to_string(path)?;
            let config = load_prompts_from_str(&file_content)?;
            info!("Loaded prompt templates from '{}'", path);
            Ok(config)
        }
        None => Ok(Arc::new(PromptConfig::default())),
    }
}

pub fn get_quick_answers_prompt(config: &PromptConfig, reply: &str) -> String {
    config.quick_answers.replace("{reply}", reply)
}

pub fn get_summary_prompt(config: &PromptConfig, conversation: &str) -> String {
    config.summary.replace("{conversation}", conversation)
}
