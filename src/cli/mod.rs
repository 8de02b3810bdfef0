use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    /// Directory holding the front-end page (index.html) and its assets.
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: String,

    // --- Remote API Args ---
    /// API key for the OpenAI-compatible chat API. Keys not starting with "sk-" are ignored
    /// and the server answers with simulated responses instead.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API (without the /chat/completions route).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Model used when a request does not name one (e.g., gpt-4o, gpt-4-turbo).
    #[arg(long, env = "DEFAULT_MODEL", default_value = "gpt-4o")]
    pub default_model: String,

    /// Upper bound on tokens generated for a chat reply.
    #[arg(long, env = "MAX_TOKENS", default_value = "500")]
    pub max_tokens: u32,

    /// Sampling temperature for chat replies.
    #[arg(long, env = "TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Timeout in seconds applied to every remote API request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    /// Number of retries on network errors, rate limits and 5xx responses.
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Optional JSON file overriding the quick-answer and summary prompt templates.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
