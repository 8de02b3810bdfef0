//! Canned replies used whenever the remote API cannot answer.

pub const EMPTY_INPUT_REPLY: &str = "I'm here to help! Feel free to ask me anything.";

pub const GREETING_REPLY: &str = "Hello! I'm your AI assistant. How can I help you today?";

pub const WELL_BEING_REPLY: &str =
    "I'm functioning well, thank you for asking! I'm here to assist you with any questions or tasks you might have.";

pub const WEATHER_REPLY: &str =
    "As a simulated response, I don't have access to real-time weather data. When you use the 'Continue in ChatGPT' feature with a valid API key, you can ask about weather and get more useful responses.";

pub const HELP_REPLY: &str =
    "I'd be happy to help! Currently, I'm running in simulation mode while waiting for a valid API key. You can test the interface and especially the 'Continue in ChatGPT' feature, which will allow you to continue this conversation with the full capabilities of GPT-4.";

pub const TIME_REPLY: &str =
    "I'm a simulated response and don't have access to the current time or date. This is a temporary solution while waiting for a valid API key. Try the 'Continue in ChatGPT' feature to get more accurate responses!";

pub const GENERIC_REPLY: &str =
    "This is a simulated response while we're waiting for a valid OpenAI API key. Feel free to test the interface, especially the 'Continue in ChatGPT' feature which allows you to take this conversation to the full GPT-4 model for more detailed responses.\n\nOnce you provide a valid API key, you'll get genuine AI-generated responses here instead of this placeholder.";

/// Keyword buckets in priority order; the first bucket with a matching keyword answers.
const BUCKETS: [(&[&str], &str); 5] = [
    (&["hello", "hi "], GREETING_REPLY),
    (&["how are you"], WELL_BEING_REPLY),
    (&["weather"], WEATHER_REPLY),
    (&["help", "can you"], HELP_REPLY),
    (&["time", "date"], TIME_REPLY),
];

pub fn fallback_reply(last_user_text: &str) -> String {
    if last_user_text.trim().is_empty() {
        return EMPTY_INPUT_REPLY.to_string();
    }

    let lower = last_user_text.to_lowercase();
    BUCKETS.iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(GENERIC_REPLY)
        .to_string()
}
