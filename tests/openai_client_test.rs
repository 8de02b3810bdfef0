use axum::{ extract::State, http::StatusCode, routing::{ get, post }, Json, Router };
use chat_relay::agent::RelayAgent;
use chat_relay::config::prompt::PromptConfig;
use chat_relay::config::{ Credential, RelayConfig };
use chat_relay::llm::chat::openai::OpenAIChatClient;
use chat_relay::llm::chat::{ ChatClient, CompletionRequest };
use chat_relay::llm::LlmError;
use chat_relay::models::chat::{ ChatMessage, Role };
use serde_json::{ json, Value };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::Arc;
use std::time::Duration;

/// Fake upstream: fails the first `failures` completion calls with `status`, then answers.
#[derive(Clone)]
struct Upstream {
    calls: Arc<AtomicUsize>,
    failures: usize,
    status: StatusCode,
}

async fn completions(
    State(upstream): State<Upstream>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let n = upstream.calls.fetch_add(1, Ordering::SeqCst);
    if n < upstream.failures {
        return (upstream.status, Json(json!({ "error": { "message": "scripted failure" } })));
    }

    let content = if body.get("response_format").is_some() {
        r#"{"suggestions": ["Tell me about Lyon", "Best season to visit?", "Local food?"]}"#
    } else {
        "Paris is the capital of France."
    };
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })),
    )
}

async fn models() -> Json<Value> {
    Json(json!({
        "data": [{ "id": "gpt-4o-2024-08-06" }, { "id": "gpt-4o-mini" }, { "id": "tts-1" }]
    }))
}

async fn spawn_upstream(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = Upstream { calls: calls.clone(), failures, status };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .route("/v1/models", get(models))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), calls)
}

fn client(base_url: String, max_retries: u32) -> OpenAIChatClient {
    OpenAIChatClient::new("sk-test".into(), Some(base_url), Duration::from_secs(5), max_retries)
        .unwrap()
        .with_initial_backoff(Duration::from_millis(5))
}

fn question() -> CompletionRequest {
    CompletionRequest {
        model: "gpt-4o".into(),
        messages: vec![ChatMessage { role: Role::User, content: "Capital of France?".into() }],
        max_tokens: 500,
        temperature: 0.7,
        json_output: false,
    }
}

#[tokio::test]
async fn completes_and_lists_models() {
    let (base_url, _) = spawn_upstream(0, StatusCode::OK).await;
    let client = client(base_url, 0);

    let response = client.complete(&question()).await.unwrap();
    assert_eq!(response.message.role, Role::Assistant);
    assert_eq!(response.message.content, "Paris is the capital of France.");

    let models = client.list_models().await.unwrap();
    assert_eq!(models, vec!["gpt-4o-2024-08-06", "gpt-4o-mini", "tts-1"]);
}

#[tokio::test]
async fn retries_server_errors_until_success() {
    let (base_url, calls) = spawn_upstream(2, StatusCode::SERVICE_UNAVAILABLE).await;
    let response = client(base_url, 3).complete(&question()).await.unwrap();
    assert_eq!(response.message.content, "Paris is the capital of France.");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_retry_budget() {
    let (base_url, calls) = spawn_upstream(10, StatusCode::TOO_MANY_REQUESTS).await;
    let err = client(base_url, 2).complete(&question()).await.unwrap_err();
    assert!(matches!(err, LlmError::RateLimited(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn does_not_retry_authentication_errors() {
    let (base_url, calls) = spawn_upstream(10, StatusCode::UNAUTHORIZED).await;
    let err = client(base_url, 3).complete(&question()).await.unwrap_err();
    assert!(matches!(err, LlmError::Authentication { status: 401, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn relay_uses_upstream_reply_and_suggestions() {
    let (base_url, _) = spawn_upstream(0, StatusCode::OK).await;
    let config = RelayConfig {
        credential: Credential::parse(Some("sk-test")),
        base_url,
        max_retries: 0,
        ..RelayConfig::default()
    };
    let agent = RelayAgent::new(config, Arc::new(PromptConfig::default()));
    assert!(!agent.is_simulated());

    let body = json!({ "messages": [{ "role": "user", "content": "Capital of France?" }] });
    let reply = agent.handle_chat(&body).await.unwrap();
    assert_eq!(reply.message.content, "Paris is the capital of France.");
    assert_eq!(
        reply.quick_answers.as_slice(),
        ["Tell me about Lyon", "Best season to visit?", "Local food?"]
    );

    let listed = agent.list_models().await;
    assert_eq!(listed.models, vec!["gpt-4o-2024-08-06", "gpt-4o-mini"]);
    assert_eq!(listed.simulated, None);
}
