use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ChatError;

pub const DEFAULT_CONFIG_PATH: &str = "configs/application.yml";
pub const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_API_BASE: &str = "https://gigachat.devices.sberbank.ru/api";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/**
 * \brief Whole application configuration as read from YAML.
 */
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/**
 * \brief OAuth client settings and the credential cache.
 */
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub save_token: bool,
    pub token_file_path: PathBuf,
    pub auth_url: String,
    pub scope: String,
    /** \brief Treat the token as expired this many ms before its deadline */
    pub expiry_margin_ms: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            save_token: true,
            token_file_path: PathBuf::from("token.json"),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            expiry_margin_ms: 0,
        }
    }
}

/**
 * \brief Model/sampling parameters and the transcript cache.
 */
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f64,
    pub n: i64,
    pub max_tokens: i64,
    pub repetition_penalty: f64,
    pub save_history: bool,
    pub history_file_path: PathBuf,
    pub api_base: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "GigaChat:latest".to_string(),
            temperature: 0.87,
            n: 1,
            max_tokens: 512,
            repetition_penalty: 1.07,
            save_history: true,
            history_file_path: PathBuf::from("history.json"),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /** \brief none/error/info/debug/all */
    pub level: String,
    /** \brief Log file, empty means stderr */
    pub file: String,
}

impl AppConfig {
    /**
     * \brief Read, parse and validate the YAML file at `path`.
     */
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ChatError::Config(msg) => ChatError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, ChatError> {
        let config: AppConfig = serde_yaml::from_str(content)
            .map_err(|e| ChatError::Config(format!("invalid config format: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /**
     * \brief Client id and secret are mandatory; the expiry margin may
     * only move the deadline earlier.
     */
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.client.client_id.is_empty() || self.client.client_secret.is_empty() {
            return Err(ChatError::Config("empty client data".to_string()));
        }
        if self.client.expiry_margin_ms < 0 {
            return Err(ChatError::Config(format!(
                "expiry_margin_ms must not be negative: {}",
                self.client.expiry_margin_ms
            )));
        }
        Ok(())
    }
}
