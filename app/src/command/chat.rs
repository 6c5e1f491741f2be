//! Conversation command: interactive console or a single message.

use std::path::PathBuf;

use banker_config::Config;
use tracing::info;

use super::build_session;
use crate::console;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional override for where `save` writes
    pub log_file: Option<PathBuf>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let log_file = input
            .log_file
            .unwrap_or_else(|| config.session.log_file.clone());

        let mut session = build_session(&config, input.model);
        info!(
            "Starting conversation session: {}",
            session.transcript().session_id()
        );

        if let Some(msg) = input.message {
            let reply = session.submit(&msg).await?;
            println!("{reply}");
        } else {
            console::run_interactive(&mut session, &log_file).await?;
        }

        Ok(())
    }
}
