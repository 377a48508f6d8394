use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_backup_server::agent::{is_exit_command, Agent, AgentConfig, LogFileArgs};

/// Chat with a local language model that can call the inventory API
#[derive(Debug, Parser)]
#[command(name = "agent", version, about)]
struct Cli {
    #[command(flatten)]
    config: AgentConfig,

    #[command(flatten)]
    log: LogFileArgs,

    /// Answer a single message and exit instead of starting the prompt loop
    #[arg(short, long)]
    message: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let file_layer = match cli.log.path() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_backup_server=info,agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let agent = Agent::from_config(&cli.config)?;

    if let Some(message) = cli.message {
        println!("{}", agent.chat(&message).await);
        return Ok(());
    }

    tracing::info!("Agent started");
    println!("Agent active. Type 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit_command(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = agent.chat(&line).await;
        println!("Assistant: {response}\n");
    }

    tracing::info!("Agent shutting down");
    Ok(())
}
