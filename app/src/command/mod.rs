//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::time::Duration;

use banker_config::Config;
use banker_conversation::SessionController;
use banker_providers::MistralProvider;
use tracing::info;

mod chat;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the provider from config, with an optional model override.
fn build_provider(config: &Config, model: Option<String>) -> MistralProvider {
    let model = model.unwrap_or_else(|| config.agent.model.clone());
    info!("Using model {model}");

    let provider = MistralProvider::new(config.provider.api_key.clone())
        .with_model(model)
        .with_temperature(config.agent.temperature)
        .with_max_tokens(config.agent.max_tokens)
        .with_timeout(Duration::from_secs(config.provider.timeout_secs));

    match &config.provider.base_url {
        Some(url) => provider.with_base_url(url.clone()),
        None => provider,
    }
}

fn build_session(config: &Config, model: Option<String>) -> SessionController<MistralProvider> {
    SessionController::new(build_provider(config, model), config.system_prompt())
}
