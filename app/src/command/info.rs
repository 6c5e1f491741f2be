use banker_config::{API_KEY_ENV, Config, DEFAULT_SYSTEM_PROMPT};
use banker_providers::DEFAULT_BASE_URL;

/// Strategy for displaying configuration information.
///
/// Prints the effective configuration with the API key masked. Missing
/// values are reported rather than treated as errors.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::read()?;

        println!("=== banker Configuration ===\n");

        println!("Config Dir: {}", Config::config_dir()?.display());
        println!();

        println!("Provider:");
        println!("  API Key: {}", mask_key(&config.provider.api_key));
        println!(
            "  Base URL: {}",
            config
                .provider
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
        );
        println!("  Timeout: {}s", config.provider.timeout_secs);
        println!();

        println!("Agent Defaults:");
        println!("  Model: {}", config.agent.model);
        println!("  Max Tokens: {}", config.agent.max_tokens);
        println!("  Temperature: {}", config.agent.temperature);
        let prompt_source = if config.system_prompt() == DEFAULT_SYSTEM_PROMPT {
            "built-in"
        } else {
            "custom"
        };
        println!(
            "  System Prompt ({prompt_source}): {}",
            truncate(config.system_prompt(), 60)
        );
        println!();

        println!("Session:");
        println!("  Log File: {}", config.session.log_file.display());

        if let Err(e) = config.validate() {
            println!();
            println!("⚠️  {e}");
        }

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => format!("(not set, use {API_KEY_ENV})"),
        1..=8 => "***".to_string(),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{head}...{tail}")
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let first_line = s.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let head: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
