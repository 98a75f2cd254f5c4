use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub const CURRENT_CONFIG_VERSION: &str = "v1";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5002;
pub const DEFAULT_CONTEXT_BUDGET_CHARS: usize = 12_000;
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

fn default_public_base_url() -> String {
    format!("http://localhost:{DEFAULT_PORT}")
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AiProvider {
    /// Any OpenAI-compatible chat completions endpoint (Groq by default).
    #[default]
    #[strum(to_string = "openai", serialize = "groq")]
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    #[serde(alias = "relayUrl", skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,
    #[serde(alias = "relayToken", skip_serializing_if = "Option::is_none")]
    pub relay_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl MailConfig {
    pub fn relay_token(&self) -> Option<SecretString> {
        self.relay_token.clone().map(SecretString::from)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,
    #[serde(alias = "apiBase", skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(alias = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    #[serde(alias = "maxTokens")]
    pub max_tokens: u32,
    #[serde(alias = "contextBudgetChars")]
    pub context_budget_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::OpenAi,
            api_base: None,
            api_key: None,
            model: None,
            temperature: 0.1,
            max_tokens: 1024,
            context_budget_chars: DEFAULT_CONTEXT_BUDGET_CHARS,
        }
    }
}

impl AiConfig {
    pub fn api_key(&self) -> Option<SecretString> {
        self.api_key.clone().map(SecretString::from)
    }

    pub fn api_base(&self) -> &str {
        match (&self.api_base, self.provider) {
            (Some(base), _) => base,
            (None, AiProvider::OpenAi) => DEFAULT_OPENAI_API_BASE,
            (None, AiProvider::Gemini) => DEFAULT_GEMINI_API_BASE,
        }
    }

    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, AiProvider::OpenAi) => DEFAULT_OPENAI_MODEL,
            (None, AiProvider::Gemini) => DEFAULT_GEMINI_MODEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "configVersion")]
    pub config_version: String,
    #[serde(alias = "databaseUrl", skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub server: ServerConfig,
    #[serde(alias = "publicBaseUrl")]
    pub public_base_url: String,
    pub mail: MailConfig,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_raw(raw_config: &str) -> Self {
        match serde_json::from_str::<Config>(raw_config) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config (line {}, column {}): {}, using default",
                    e.line(),
                    e.column(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.config_version = CURRENT_CONFIG_VERSION.to_string();

        self.database_url = blank_to_none(self.database_url);
        self.mail.relay_url = blank_to_none(self.mail.relay_url);
        self.mail.relay_token = blank_to_none(self.mail.relay_token);
        self.mail.from = blank_to_none(self.mail.from);
        self.ai.api_base = blank_to_none(self.ai.api_base);
        self.ai.api_key = blank_to_none(self.ai.api_key);
        self.ai.model = blank_to_none(self.ai.model);

        if self.server.host.trim().is_empty() {
            self.server.host = DEFAULT_HOST.to_string();
        }

        let base_url = self.public_base_url.trim().trim_end_matches('/');
        self.public_base_url = if base_url.is_empty() {
            default_public_base_url()
        } else {
            base_url.to_string()
        };

        if self.ai.context_budget_chars == 0 {
            tracing::warn!("AI context budget must be positive, resetting to default");
            self.ai.context_budget_chars = DEFAULT_CONTEXT_BUDGET_CHARS;
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION.to_string(),
            database_url: None,
            server: ServerConfig::default(),
            public_base_url: default_public_base_url(),
            mail: MailConfig::default(),
            ai: AiConfig::default(),
        }
    }
}
