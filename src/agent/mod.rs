//! Command-line agent: asks a language model what to do with the user's
//! text, runs at most one tool, and optionally has the model summarise the
//! tool output.

pub mod action;
pub mod config;
pub mod llm;
pub mod scan;
pub mod tools;

pub use action::{Action, UserRef};
pub use config::{AgentConfig, LogFileArgs};
pub use llm::{ChatMessage, LlmClient, LlmError};
pub use scan::{extract_object, ScanError};
pub use tools::Tools;

pub const SYSTEM_PROMPT: &str = r#"
You are an intelligent assistant with access to three tools.
Only use these tools and do not use any other external resources.

TOOL 1: get_weather
Purpose: retrieve weather information for a city.
Usage:
{"action": "get_weather", "city": "<city name>"}

TOOL 2: fetch_url
Purpose: fetch any HTTP/HTTPS URL (GET, POST, PUT, DELETE).
Usage:
{"action": "fetch_url", "url": "<full URL>", "method": "<GET|POST|PUT|DELETE>", "data": { ... }}
"data" is optional and only used for POST/PUT.

TOOL 3: manage_users
Purpose: perform CRUD operations on the /users endpoints.
Usage:
{"action": "manage_users", "method": "<GET|POST|PUT|DELETE>", "user_id": <optional>, "data": {"user_name": "<name>"}}
"data" is only used for POST/PUT.

RULES:
* Always output exactly one JSON object for a tool call
* Use get_weather any time the user asks about weather
* Only use the other tools when needed
* Otherwise respond normally
"#;

const SUMMARY_PROMPT: &str = "Summarize the following API response clearly:\n";

pub struct Agent {
    llm: LlmClient,
    tools: Tools,
}

impl Agent {
    pub fn new(llm: LlmClient, tools: Tools) -> Self {
        Self { llm, tools }
    }

    /// Build the model client and tools from configuration
    ///
    /// Tool calls get the configured timeout; model calls do not, since a
    /// local model can legitimately take a long time to answer.
    pub fn from_config(config: &AgentConfig) -> Result<Self, reqwest::Error> {
        let llm_http = reqwest::Client::builder().build()?;
        let tool_http = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Self::new(
            LlmClient::new(llm_http, &config.llm_url, config.model.clone()),
            Tools::new(tool_http, config.api_base()),
        ))
    }

    /// Handle one user message and return the text to show
    pub async fn chat(&self, user_msg: &str) -> String {
        tracing::info!(message = %user_msg, "User message");

        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_msg)];
        let content = match self.llm.chat(&messages).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "LLM connection error");
                return format!("LLM connection error: {e}");
            }
        };
        tracing::info!(response = %content, "LLM response");

        let directive = match extract_object(&content) {
            Ok(directive) => directive,
            Err(ScanError::NotFound) => return content,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring tool directive");
                return content;
            }
        };

        match Action::from_directive(directive) {
            Ok(action) => self.dispatch(action).await,
            Err(e) => {
                tracing::warn!(error = %e, "Reply is not a recognised action");
                content
            }
        }
    }

    async fn dispatch(&self, action: Action) -> String {
        match action {
            Action::GetWeather { city } => match city.as_deref().map(str::trim) {
                Some(city) if !city.is_empty() => self.tools.call_weather(city).await,
                _ => "Error fetching weather: no city given".to_string(),
            },
            Action::FetchUrl { url, method, data } => {
                let url = url.unwrap_or_default();
                if !url.starts_with("http") {
                    tracing::warn!(url = %url, "Invalid URL");
                    return format!("Invalid URL: {url}");
                }
                let raw = self
                    .tools
                    .fetch_url_content(&url, method.as_deref().unwrap_or("GET"), data.as_ref())
                    .await;
                self.summarize(&raw).await
            }
            Action::ManageUsers {
                method,
                user_id,
                data,
            } => {
                let user_id = user_id.as_ref().and_then(UserRef::path_segment);
                let raw = self
                    .tools
                    .call_user_api(
                        method.as_deref().unwrap_or("GET"),
                        user_id.as_deref(),
                        data.as_ref().filter(|d| !d.is_null()),
                    )
                    .await;
                self.summarize(&raw).await
            }
        }
    }

    /// Ask the model for a plain-language summary of a tool result
    pub async fn summarize(&self, text: &str) -> String {
        tracing::info!("Summarizing API response");

        let prompt = format!("{SUMMARY_PROMPT}{text}");
        match self.llm.chat(&[ChatMessage::user(prompt)]).await {
            Ok(summary) => {
                tracing::info!("Summarization completed");
                summary
            }
            Err(e) => {
                tracing::error!(error = %e, "Error summarizing response");
                format!("Error summarizing response: {e}")
            }
        }
    }
}

/// Whether a REPL line ends the session
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_exit_command() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT \n"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_system_prompt_names_every_tool() {
        for tool in ["get_weather", "fetch_url", "manage_users"] {
            assert!(SYSTEM_PROMPT.contains(tool));
        }
    }
}
