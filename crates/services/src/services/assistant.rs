use std::sync::Arc;

use async_trait::async_trait;
use db::{
    DbErr, DbPool, TransactionTrait,
    models::{ai_chat_message::AiChatMessage, support_note::SupportNote},
    retry_on_sqlite_busy,
    types::ChatRole,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use super::config::{AiConfig, AiProvider};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Falta la API Key del proveedor de IA")]
    NotConfigured,
    #[error("La consulta 'query' es requerida.")]
    EmptyQuery,
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Upstream(format!("AI request failed: {err}"))
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct AskRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AskResponse {
    pub response: String,
}

/// Answers a question using only the supplied notes.
#[async_trait]
pub trait SupportAssistant: Send + Sync {
    async fn ask(&self, query: &str, context: &str) -> Result<String, AssistantError>;
}

pub fn system_prompt(context: &str) -> String {
    format!(
        "Eres un asistente de soporte técnico experto y útil. \
Tienes acceso a las siguientes NOTAS DE SOPORTE del usuario:\n\n{context}\n\n\
TU TAREA: Responde a la pregunta del usuario basándote EXCLUSIVAMENTE en la información de estas notas. \
Si la respuesta no está en las notas, di claramente que no tienes información al respecto. \
No inventes datos. Sé conciso y directo."
    )
}

/// Lists notes as `- [YYYY-MM-DD] Title: Content`, in the given order, until
/// `budget` characters are used.
pub fn build_context(notes: &[SupportNote], budget: usize) -> String {
    let mut context = String::new();
    let mut used = 0;

    for note in notes {
        let line = format!(
            "- [{}] {}: {}\n",
            note.created_at.format("%Y-%m-%d"),
            note.title,
            note.content
        );
        let len = line.chars().count();
        if used + len > budget {
            if used == 0 {
                context.extend(line.chars().take(budget));
            }
            tracing::debug!(notes = notes.len(), budget, "AI context truncated");
            break;
        }
        context.push_str(&line);
        used += len;
    }
    context
}

fn non_empty_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

async fn upstream_failure(provider: &str, response: reqwest::Response) -> AssistantError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| body.trim().to_string());
    tracing::warn!(provider, %status, "AI provider returned an error");
    if message.is_empty() {
        AssistantError::Upstream(format!("{provider} respondió con estado {status}"))
    } else {
        AssistantError::Upstream(format!("{provider} respondió con estado {status}: {message}"))
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ProviderErrorResponse = serde_json::from_str(body).ok()?;
    parsed.error.and_then(|err| err.message)
}

/// Any OpenAI-compatible `chat/completions` endpoint. Groq by default.
pub struct OpenAiCompatibleAssistant {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn format_openai_url(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        format!("{trimmed}/chat/completions")
    } else {
        format!("{trimmed}/v1/chat/completions")
    }
}

fn extract_chat_answer(response: ChatResponse) -> Option<String> {
    response
        .choices
        .iter()
        .find_map(|choice| non_empty_text(choice.message.as_ref()?.content.as_deref()))
}

impl OpenAiCompatibleAssistant {
    pub fn new(config: &AiConfig, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base().to_string(),
            api_key,
            model: config.model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl SupportAssistant for OpenAiCompatibleAssistant {
    async fn ask(&self, query: &str, context: &str) -> Result<String, AssistantError> {
        let system = system_prompt(context);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format_openai_url(&self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_failure("openai", response).await);
        }

        let data = response.json::<ChatResponse>().await?;
        extract_chat_answer(data)
            .ok_or_else(|| AssistantError::Upstream("La IA no devolvió respuesta".to_string()))
    }
}

/// Google Gemini `generateContent`.
pub struct GeminiAssistant {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

fn extract_gemini_answer(response: GeminiResponse) -> Option<String> {
    response.candidates.into_iter().find_map(|candidate| {
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        non_empty_text(Some(text.as_str()))
    })
}

impl GeminiAssistant {
    pub fn new(config: &AiConfig, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base().trim_end_matches('/').to_string(),
            api_key,
            model: config.model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl SupportAssistant for GeminiAssistant {
    async fn ask(&self, query: &str, context: &str) -> Result<String, AssistantError> {
        let system = system_prompt(context);
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: &system }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: query }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_failure("gemini", response).await);
        }

        let data = response.json::<GeminiResponse>().await?;
        extract_gemini_answer(data)
            .ok_or_else(|| AssistantError::Upstream("La IA no devolvió respuesta".to_string()))
    }
}

/// Stands in when no API key is configured.
pub struct UnconfiguredAssistant;

#[async_trait]
impl SupportAssistant for UnconfiguredAssistant {
    async fn ask(&self, _query: &str, _context: &str) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }
}

pub fn assistant_from_config(config: &AiConfig) -> Arc<dyn SupportAssistant> {
    let Some(api_key) = config
        .api_key()
        .filter(|key| !key.expose_secret().starts_with("YOUR_"))
    else {
        tracing::warn!("No AI API key configured, the support assistant is disabled");
        return Arc::new(UnconfiguredAssistant);
    };

    tracing::info!(provider = %config.provider, model = config.model(), "support assistant ready");
    match config.provider {
        AiProvider::OpenAi => Arc::new(OpenAiCompatibleAssistant::new(config, api_key)),
        AiProvider::Gemini => Arc::new(GeminiAssistant::new(config, api_key)),
    }
}

#[derive(Clone)]
pub struct AssistantService {
    assistant: Arc<dyn SupportAssistant>,
    context_budget_chars: usize,
}

impl AssistantService {
    pub fn new(assistant: Arc<dyn SupportAssistant>, context_budget_chars: usize) -> Self {
        Self {
            assistant,
            context_budget_chars,
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(assistant_from_config(config), config.context_budget_chars)
    }

    /// Answers `query` from the support notes and records both sides of the
    /// exchange. Nothing is recorded when the provider fails.
    pub async fn ask(&self, db: &DbPool, query: &str) -> Result<String, AssistantError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AssistantError::EmptyQuery);
        }

        let notes = SupportNote::find_all(db).await?;
        let context = build_context(&notes, self.context_budget_chars);
        let answer = self.assistant.ask(query, &context).await?;

        let answer_ref = answer.as_str();
        retry_on_sqlite_busy(move || async move {
            let tx = db.begin().await?;
            AiChatMessage::append(&tx, ChatRole::User, query).await?;
            AiChatMessage::append(&tx, ChatRole::Ai, answer_ref).await?;
            tx.commit().await
        })
        .await?;

        tracing::info!(notes = notes.len(), "support assistant answered");
        Ok(answer)
    }

    pub async fn history(&self, db: &DbPool) -> Result<Vec<AiChatMessage>, AssistantError> {
        Ok(AiChatMessage::history(db).await?)
    }

    pub async fn clear_history(&self, db: &DbPool) -> Result<u64, AssistantError> {
        Ok(AiChatMessage::clear(db).await?)
    }
}
