//! Follow-up suggestions shown under each assistant reply.
//!
//! Suggestions are requested from the remote API as JSON. Whatever comes back is parsed
//! leniently, and every path ends in exactly three strings: missing slots are padded from a
//! static set chosen by a small language heuristic.

use crate::config::prompt::{ get_quick_answers_prompt, PromptConfig };
use crate::llm::chat::{ ChatClient, CompletionRequest };
use crate::models::chat::{ ChatMessage, Role };
use log::{ debug, warn };
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use std::sync::Arc;

const SUGGESTIONS_FIELD: &str = "suggestions";
const QUICK_ANSWER_MAX_TOKENS: u32 = 150;
const QUICK_ANSWER_TEMPERATURE: f32 = 0.7;

static LIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:\d+[.)]|[-*•])\s+(.+?)\s*$").expect("valid list item regex")
});

// The optional trailing colon marks JSON keys, which are not suggestions.
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"\n]{2,120})"(\s*:)?"#).expect("valid quoted phrase regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
    Spanish,
    Portuguese,
    Italian,
    French,
}

impl Language {
    pub fn default_quick_answers(self) -> [&'static str; 3] {
        match self {
            Language::English => ["Tell me more", "Can you give an example?", "What else should I know?"],
            Language::German => ["Erzähl mir mehr", "Kannst du ein Beispiel geben?", "Was sollte ich noch wissen?"],
            Language::Spanish => ["Cuéntame más", "¿Puedes dar un ejemplo?", "¿Qué más debería saber?"],
            Language::Portuguese => ["Conte-me mais", "Pode dar um exemplo?", "O que mais devo saber?"],
            Language::Italian => ["Dimmi di più", "Puoi fare un esempio?", "Cos'altro dovrei sapere?"],
            Language::French => ["Dis-m'en plus", "Peux-tu donner un exemple ?", "Que dois-je savoir d'autre ?"],
        }
    }
}

/// Marker characters and words per language, checked in this order.
const LANGUAGE_MARKERS: [(Language, &[char], &[&str]); 5] = [
    (Language::German, &['ä', 'ö', 'ü', 'ß'], &["und", "nicht", "ich", "danke"]),
    (Language::Spanish, &['ñ', '¿', '¡'], &["usted", "gracias", "hola", "qué"]),
    (Language::Portuguese, &['ã', 'õ'], &["você", "obrigado", "obrigada", "não"]),
    (Language::Italian, &[], &["grazie", "ciao", "perché", "sono"]),
    (Language::French, &['è', 'ê', 'ë', 'î', 'ô', 'œ', 'ç'], &["vous", "merci", "bonjour", "je"]),
];

pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    LANGUAGE_MARKERS.iter()
        .find(|(_, chars, keywords)| {
            lower.chars().any(|c| chars.contains(&c)) ||
                words.iter().any(|w| keywords.contains(w))
        })
        .map(|(language, _, _)| *language)
        .unwrap_or(Language::English)
}

/// Exactly three suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAnswerSet([String; 3]);

impl QuickAnswerSet {
    pub fn defaults(language: Language) -> Self {
        Self(language.default_quick_answers().map(str::to_string))
    }

    /// Keeps the first three candidates and pads with the language defaults.
    pub fn from_candidates(candidates: Vec<String>, language: Language) -> Self {
        let mut answers = Self::defaults(language).0;
        for (slot, candidate) in answers.iter_mut().zip(candidates) {
            *slot = candidate;
        }
        Self(answers)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

fn collect_strings(items: &[JsonValue]) -> Vec<String> {
    items
        .iter()
        .filter_map(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads suggestions from structured output: the `suggestions` field, then any array-valued
/// field, then a bare array.
pub fn parse_structured(raw: &str) -> Option<Vec<String>> {
    let value: JsonValue = serde_json::from_str(strip_code_fence(raw)).ok()?;

    let items = match &value {
        JsonValue::Object(map) => {
            match map.get(SUGGESTIONS_FIELD) {
                Some(JsonValue::Array(items)) => items,
                _ => map.values().find_map(JsonValue::as_array)?,
            }
        }
        JsonValue::Array(items) => items,
        _ => {
            return None;
        }
    };

    let answers = collect_strings(items);
    if answers.is_empty() { None } else { Some(answers) }
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches(|c: char| c == '"' || c == '\'').trim().to_string()
}

/// Last-resort extraction from free text: list items first, then quoted phrases.
pub fn extract_from_text(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = LIST_ITEM_RE.captures_iter(raw)
        .map(|cap| unquote(&cap[1]))
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        return Some(items);
    }

    let quoted: Vec<String> = QUOTED_RE.captures_iter(raw)
        .filter(|cap| cap.get(2).is_none())
        .map(|cap| cap[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if quoted.is_empty() { None } else { Some(quoted) }
}

pub struct QuickAnswerGenerator {
    client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
}

impl QuickAnswerGenerator {
    pub fn new(client: Arc<dyn ChatClient>, prompts: Arc<PromptConfig>) -> Self {
        Self { client, prompts }
    }

    pub async fn generate(&self, reply_text: &str, model: &str) -> QuickAnswerSet {
        let language = detect_language(reply_text);
        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: get_quick_answers_prompt(&self.prompts, reply_text),
            }],
            max_tokens: QUICK_ANSWER_MAX_TOKENS,
            temperature: QUICK_ANSWER_TEMPERATURE,
            json_output: true,
        };

        let raw = match self.client.complete(&request).await {
            Ok(resp) => resp.message.content,
            Err(e) => {
                warn!("Quick answer generation failed: {}. Using static suggestions", e);
                return QuickAnswerSet::defaults(language);
            }
        };
        debug!("Quick answer raw output: {}", raw);

        if let Some(answers) = parse_structured(&raw) {
            return QuickAnswerSet::from_candidates(answers, language);
        }
        warn!("Quick answer output was not valid JSON, trying text extraction");
        match extract_from_text(&raw) {
            Some(answers) => QuickAnswerSet::from_candidates(answers, language),
            None => {
                warn!("No suggestions found in quick answer output. Using static suggestions");
                QuickAnswerSet::defaults(language)
            }
        }
    }
}
