use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::DEFAULT_SYSTEM_PROMPT;

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

const PLACEHOLDER_API_KEY: &str = "your-mistral-api-key-here";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
    #[serde(default = "AgentDefaults::default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "AgentDefaults::default_temperature")]
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            temperature: Self::default_temperature(),
            system_prompt: None,
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        "mistral-large-latest".to_string()
    }

    const fn default_max_tokens() -> usize {
        1024
    }

    const fn default_temperature() -> f32 {
        0.7
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    const fn default_timeout_secs() -> u64 {
        60
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Where the `save` command writes the transcript snapshot.
    #[serde(default = "SessionConfig::default_log_file")]
    pub log_file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_file: Self::default_log_file(),
        }
    }
}

impl SessionConfig {
    fn default_log_file() -> PathBuf {
        PathBuf::from("conversation_log.json")
    }
}

impl Config {
    /// Load `~/banker/config.json`, then apply `.env` and environment
    /// overrides.
    ///
    /// A missing file is not an error as long as the API key comes from the
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::read()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Config::load`] without validation, for inspecting a
    /// partially filled config.
    pub fn read() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let config_path = Self::config_dir()?.join("config.json");
        let config = if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            Self::load_from(&config_path)?
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replace the configured key with `key` when it is set and non-blank.
    #[must_use]
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = key;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let key = self.provider.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            anyhow::bail!(
                "{API_KEY_ENV} not found. Set it in your environment or .env file, \
                 or run 'banker init' and add it to the config file."
            );
        }
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            anyhow::bail!(
                "agent.temperature must be between 0.0 and 2.0, got {}",
                self.agent.temperature
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.agent
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("banker"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, config_template())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Mistral API key to the config file (or set {API_KEY_ENV})");
        println!("   2. Run 'banker chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - agent.model: Mistral model to use (mistral-large-latest, mistral-small-latest, ...)");
        println!("   - agent.system_prompt: replaces the built-in banking assistant prompt");
        println!("   - session.log_file: where 'save' writes the conversation");
        println!();
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "agent": {
    "model": "mistral-large-latest",
    "max_tokens": 1024,
    "temperature": 0.7
  },
  "provider": {
    "api_key": "{PLACEHOLDER}",
    "timeout_secs": 60
  },
  "session": {
    "log_file": "conversation_log.json"
  }
}"#;

fn config_template() -> String {
    CONFIG_TEMPLATE.replace("{PLACEHOLDER}", PLACEHOLDER_API_KEY)
}
