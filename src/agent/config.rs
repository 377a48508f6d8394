use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the agent, read from flags or the environment
#[derive(Debug, Clone, Args)]
pub struct AgentConfig {
    /// Base URL of the Ollama-compatible chat server
    #[arg(long, env = "OLLAMA_URL", default_value = "http://127.0.0.1:11434")]
    pub llm_url: String,

    /// Model name sent with every chat request
    #[arg(long, env = "AGENT_MODEL", default_value = "llama3.2")]
    pub model: String,

    /// Base URL of the CRUD API (weather and user management)
    #[arg(long, env = "API_BASE_URL", default_value = "http://127.0.0.1:8000")]
    pub api_base_url: String,

    /// Timeout for tool HTTP calls, in seconds
    #[arg(long, env = "AGENT_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API base without a trailing slash, so paths can be appended
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

/// Where the agent mirrors its log
#[derive(Debug, Clone, Args)]
pub struct LogFileArgs {
    /// File the log is mirrored to
    #[arg(long, env = "AGENT_LOG_FILE", default_value = "agent.log")]
    pub log_file: PathBuf,

    /// Only log to stderr
    #[arg(long)]
    pub no_log_file: bool,
}

impl LogFileArgs {
    pub fn path(&self) -> Option<&PathBuf> {
        (!self.no_log_file).then_some(&self.log_file)
    }
}
