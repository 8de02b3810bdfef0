pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod llm;
pub mod models;
pub mod quick_answers;
pub mod selector;
pub mod server;

use agent::RelayAgent;
use cli::Args;
use config::{ prompt, RelayConfig };
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = RelayConfig::from_args(&args);

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Static Directory: {}", args.static_dir);
    info!("API Base URL: {}", config.base_url);
    info!("API Credential: {:?}", config.credential);
    info!("Default Model: {}", config.default_model);
    info!("Max Tokens: {}", config.max_tokens);
    info!("Temperature: {}", config.temperature);
    info!("Request Timeout: {:?}", config.request_timeout);
    info!("Max Retries: {}", config.max_retries);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("-------------------------");

    let prompt_config = prompt::load_prompts(args.prompts_path.as_deref())?;
    let agent = Arc::new(RelayAgent::new(config, prompt_config));
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
