//! End-to-end tests for the agent against throw-away servers standing in for
//! the language model and the CRUD API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use inventory_backup_server::agent::{Agent, LlmClient, Tools};

// =============================================================================
// Test Helpers
// =============================================================================

/// Answers the tool-selection prompt with `reply`; echoes anything else back
/// prefixed with `SUMMARY:` so tests can see what was summarised.
async fn fake_chat(State(reply): State<Arc<String>>, Json(request): Json<Value>) -> Json<Value> {
    let messages = request["messages"].as_array().cloned().unwrap_or_default();
    let is_tool_prompt = messages.first().map(|m| m["role"] == "system").unwrap_or(false);

    let content = if is_tool_prompt {
        reply.as_str().to_string()
    } else {
        let prompt = messages
            .last()
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default();
        format!("SUMMARY:{prompt}")
    };

    Json(json!({
        "model": request["model"],
        "message": { "role": "assistant", "content": content },
        "done": true
    }))
}

async fn list_users() -> Json<Value> {
    Json(json!([{ "user_id": 1, "user_name": "alice" }]))
}

async fn create_user(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "user_id": 2, "user_name": body["user_name"] }))
}

async fn get_user(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({ "user_id": id, "user_name": "bob" }))
}

async fn weather(Path(city): Path<String>) -> Json<Value> {
    Json(json!({ "city": city, "temperature": 21.0, "description": "Sunny" }))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_api() -> String {
    serve(
        Router::new()
            .route("/users", get(list_users).post(create_user))
            .route("/users/:id", get(get_user))
            .route("/weather/city/:city", get(weather)),
    )
    .await
}

/// Agent whose model always answers the tool prompt with `reply`
async fn agent_with_reply(reply: &str) -> Agent {
    let llm_url = serve(
        Router::new()
            .route("/api/chat", post(fake_chat))
            .with_state(Arc::new(reply.to_string())),
    )
    .await;
    let api_url = spawn_api().await;

    Agent::new(
        LlmClient::new(reqwest::Client::new(), &llm_url, "test-model"),
        Tools::new(reqwest::Client::new(), api_url),
    )
}

// =============================================================================
// Plain Replies
// =============================================================================

#[tokio::test]
async fn test_reply_without_directive_is_returned_verbatim() {
    let agent = agent_with_reply("Hello! How can I help?").await;

    assert_eq!(agent.chat("hi").await, "Hello! How can I help?");
}

#[tokio::test]
async fn test_unknown_action_is_returned_verbatim() {
    let reply = r#"{"action": "launch_rockets"}"#;
    let agent = agent_with_reply(reply).await;

    assert_eq!(agent.chat("go").await, reply);
}

#[tokio::test]
async fn test_ambiguous_directive_is_returned_verbatim() {
    let reply = r#"{"action": "get_weather", "city": "A"} {"action": "get_weather", "city": "B"}"#;
    let agent = agent_with_reply(reply).await;

    assert_eq!(agent.chat("weather?").await, reply);
}

#[tokio::test]
async fn test_unreachable_model_yields_error_text() {
    let agent = Agent::new(
        LlmClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "test-model"),
        Tools::new(reqwest::Client::new(), "http://127.0.0.1:9"),
    );

    assert!(agent.chat("hi").await.starts_with("LLM connection error:"));
}

// =============================================================================
// Tools
// =============================================================================

#[tokio::test]
async fn test_get_weather_is_formatted_without_summary() {
    let agent =
        agent_with_reply("Let me check.\n```json\n{\"action\": \"get_weather\", \"city\": \"Paris\"}\n```")
            .await;

    assert_eq!(agent.chat("weather in Paris?").await, "Paris: Sunny, 21°C");
}

#[tokio::test]
async fn test_get_weather_without_city() {
    let agent = agent_with_reply(r#"{"action": "get_weather"}"#).await;

    assert!(agent.chat("weather?").await.starts_with("Error fetching weather"));
}

#[tokio::test]
async fn test_manage_users_list_is_summarised() {
    let agent = agent_with_reply(r#"{"action": "manage_users", "method": "GET"}"#).await;

    let answer = agent.chat("who are the users?").await;

    assert!(answer.starts_with("SUMMARY:Summarize the following API response clearly:\n"));
    assert!(answer.contains("\"user_name\": \"alice\""));
}

#[tokio::test]
async fn test_manage_users_get_by_id() {
    let agent =
        agent_with_reply(r#"{"action": "manage_users", "method": "get", "user_id": "7"}"#).await;

    let answer = agent.chat("show user 7").await;

    assert!(answer.contains("\"user_id\": 7"));
    assert!(answer.contains("bob"));
}

#[tokio::test]
async fn test_manage_users_create_sends_data() {
    let agent = agent_with_reply(
        r#"{"action": "manage_users", "method": "POST", "data": {"user_name": "carol"}}"#,
    )
    .await;

    let answer = agent.chat("add carol").await;

    assert!(answer.contains("\"user_name\": \"carol\""));
}

#[tokio::test]
async fn test_fetch_url_rejects_non_http_urls() {
    let agent = agent_with_reply(r#"{"action": "fetch_url", "url": "ftp://example.com"}"#).await;

    assert_eq!(agent.chat("fetch").await, "Invalid URL: ftp://example.com");
}

#[tokio::test]
async fn test_fetch_url_error_is_summarised() {
    let agent = agent_with_reply(r#"{"action": "fetch_url", "url": "http://127.0.0.1:9/"}"#).await;

    let answer = agent.chat("fetch").await;

    assert!(answer.contains("FETCH_ERROR:"));
}

#[tokio::test]
async fn test_fetch_url_unsupported_method() {
    let agent = agent_with_reply(
        r#"{"action": "fetch_url", "url": "http://127.0.0.1:9/", "method": "PATCH"}"#,
    )
    .await;

    let answer = agent.chat("fetch").await;

    assert!(answer.contains("Unsupported HTTP method: PATCH"));
}
