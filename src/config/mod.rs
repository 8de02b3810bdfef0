pub mod prompt;

use crate::cli::Args;
use crate::selector::DEFAULT_MODEL;
use log::{ info, warn };
use std::fmt;
use std::time::Duration;

const API_KEY_PREFIX: &str = "sk-";

/// The remote API key as found at startup.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Missing,
    Malformed,
    Valid(String),
}

impl Credential {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Credential::Missing,
            Some(key) if key.starts_with(API_KEY_PREFIX) && is_header_safe(key) => {
                Credential::Valid(key.to_string())
            }
            Some(_) => Credential::Malformed,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Credential::Valid(key) => Some(key),
            _ => None,
        }
    }

}

/// Keys end up in an `Authorization` header, so only visible ASCII is accepted.
fn is_header_safe(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_graphic())
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Missing => write!(f, "Missing"),
            Credential::Malformed => write!(f, "Malformed"),
            Credential::Valid(key) => write!(f, "Valid({})", mask_key(key)),
        }
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(API_KEY_PREFIX.len() + 2).collect();
    format!("{}****", visible)
}

/// Process-wide settings, built once in `run` and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub credential: Credential,
    pub base_url: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Missing,
            base_url: "https://api.openai.com/v1".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            request_timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Self {
        let credential = Credential::parse(args.openai_api_key.as_deref());
        match &credential {
            Credential::Valid(_) => info!("OpenAI API key available: Yes (masked)"),
            Credential::Malformed => {
                warn!("OPENAI_API_KEY does not start with '{}'; using simulated responses", API_KEY_PREFIX)
            }
            Credential::Missing => warn!("No OpenAI API key found; using simulated responses"),
        }

        let default_model = if args.default_model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            args.default_model.trim().to_string()
        };

        Self {
            credential,
            base_url: args.openai_base_url.clone(),
            default_model,
            max_tokens: args.max_tokens,
            temperature: args.temperature,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            max_retries: args.max_retries,
        }
    }
}
