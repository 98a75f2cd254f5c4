use std::{path::Path, str::FromStr};

use thiserror::Error;

mod schema;

pub use schema::{
    AiConfig, AiProvider, CURRENT_CONFIG_VERSION, Config, DEFAULT_CONTEXT_BUDGET_CHARS,
    DEFAULT_HOST, DEFAULT_PORT, MailConfig, ServerConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Will always return config, falling back to defaults on missing/invalid files.
pub async fn load_config_from_file(config_path: &Path) -> Config {
    match tokio::fs::read_to_string(config_path).await {
        Ok(raw_config) => Config::from_raw(&raw_config),
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                tracing::info!("No config file found, using defaults");
            } else {
                tracing::warn!("Failed to read config file: {}", err);
            }
            Config::default()
        }
    }
}

/// Saves the config to the given path
pub async fn save_config_to_file(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    let normalized = config.clone().normalized();
    let raw_config = serde_json::to_string_pretty(&normalized)?;
    tokio::fs::write(config_path, raw_config).await?;
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_env<F>(lookup: &F, primary: &str, fallback: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(primary)).or_else(|| non_empty(lookup(fallback)))
}

impl Config {
    /// Applies environment overrides on top of the file config.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = resolve_env(&lookup, "PENDIENTES_DATABASE_URL", "DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(host) = non_empty(lookup("HOST")) {
            self.server.host = host;
        }
        if let Some(port) = resolve_env(&lookup, "BACKEND_PORT", "PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("invalid port '{port}'"))
            })?;
        }
        if let Some(base_url) = non_empty(lookup("PENDIENTES_PUBLIC_BASE_URL")) {
            self.public_base_url = base_url;
        }

        if let Some(url) = non_empty(lookup("PENDIENTES_MAIL_RELAY_URL")) {
            self.mail.relay_url = Some(url);
        }
        if let Some(token) = non_empty(lookup("PENDIENTES_MAIL_RELAY_TOKEN")) {
            self.mail.relay_token = Some(token);
        }
        if let Some(from) = non_empty(lookup("PENDIENTES_MAIL_FROM")) {
            self.mail.from = Some(from);
        }

        if let Some(provider) = non_empty(lookup("PENDIENTES_AI_PROVIDER")) {
            self.ai.provider = AiProvider::from_str(&provider).map_err(|_| {
                ConfigError::ValidationError(format!(
                    "unknown AI provider '{provider}', expected 'openai' or 'gemini'"
                ))
            })?;
        }
        if let Some(base) = resolve_env(&lookup, "PENDIENTES_AI_API_BASE", "OPENAI_API_BASE") {
            self.ai.api_base = Some(base);
        }
        let key_fallback = match self.ai.provider {
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        };
        if let Some(key) = resolve_env(&lookup, "PENDIENTES_AI_API_KEY", key_fallback) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = resolve_env(&lookup, "PENDIENTES_AI_MODEL", "OPENAI_DEFAULT_MODEL") {
            self.ai.model = Some(model);
        }

        Ok(self.normalized())
    }
}
