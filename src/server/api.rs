use crate::agent::RelayAgent;
use crate::error::RelayError;
use crate::models::chat::{ ChatReply, ModelList, Summary };
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::State,
    Json,
};
use serde_json::Value as JsonValue;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;
use log::{ debug, info };

#[derive(Clone)]
pub struct AppState {
    agent: Arc<RelayAgent>,
}

/// Builds the API router. When `static_dir` is given, unmatched paths are served from it.
pub fn router(agent: Arc<RelayAgent>, static_dir: Option<&Path>) -> Router {
    let app_state = AppState { agent };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/models", get(models_handler))
        .route("/api/summarize", post(summarize_handler));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(cors).with_state(app_state)
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<RelayAgent>,
    static_dir: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(agent, Some(Path::new(static_dir)));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
    })?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn parse_body(body: &Bytes) -> Result<JsonValue, RelayError> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| RelayError::InvalidInput(format!("Invalid JSON body: {}", e)))?;
    debug!("Received request body: {}", value);
    Ok(value)
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatReply>, RelayError> {
    let value = parse_body(&body)?;
    let reply = state.agent.handle_chat(&value).await?;
    Ok(Json(reply))
}

async fn models_handler(State(state): State<AppState>) -> Json<ModelList> {
    Json(state.agent.list_models().await)
}

async fn summarize_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Summary>, RelayError> {
    let value = parse_body(&body)?;
    let summary = state.agent.summarize(&value).await?;
    Ok(Json(summary))
}
