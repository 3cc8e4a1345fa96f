use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gigachat_core_sdk::config::DEFAULT_CONFIG_PATH;
use gigachat_core_sdk::logger::{FileLogger, Logger};
use gigachat_core_sdk::{AppConfig, ConversationCoordinator, CredentialManager};

const REPLY_PREFIX: &str = "GigaChat>\t";

/**
 * \brief Ask one question, optionally continuing the saved conversation.
 */
#[derive(Parser, Debug)]
#[command(name = "gigachat", version, about = "GigaChat command-line client")]
struct Cli {
    /// Continue with message history
    #[arg(short = 'c', long = "continue")]
    continuation: bool,

    /// YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Question sent to the model
    question: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config).context("load config failed")?;

    let logger: Arc<dyn Logger> = Arc::new(FileLogger::from_config(&config.log));

    let credentials = CredentialManager::new(config.client.clone(), logger.clone())
        .context("create credential manager failed")?;
    let mut coordinator =
        ConversationCoordinator::new(credentials, config.chat.clone(), logger.clone())
            .context("create chat coordinator failed")?;

    match coordinator.exchange(&cli.question, cli.continuation).await {
        Ok(reply) => print!("{REPLY_PREFIX}{reply}"),
        Err(err) => {
            logger.error("cli", "response error", &err);
            print!("{REPLY_PREFIX}{err}");
        }
    }
    std::io::stdout().flush().ok();

    Ok(())
}
