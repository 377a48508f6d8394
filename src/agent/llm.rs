//! Minimal client for an Ollama-compatible `/api/chat` endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request to language model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model reply has no message content")]
    EmptyReply,
}

/// One chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    chat_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, base_url: &str, model: impl Into<String>) -> Self {
        Self {
            http,
            chat_url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.into(),
        }
    }

    /// Send the conversation and return the assistant's text
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let reply: ChatResponse = self
            .http
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        reply
            .message
            .map(|m| m.content)
            .ok_or(LlmError::EmptyReply)
    }
}
