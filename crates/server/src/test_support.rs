use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use db::DBService;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use services::services::{
    assistant::{AssistantError, AssistantService, SupportAssistant},
    config::Config,
    email::{EmailError, EmailMessage, Mailer},
    notification::NotificationService,
};
use tower::ServiceExt;

use crate::{DeploymentImpl, http};

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Replies with a fixed answer, or fails like an unreachable provider.
pub struct CannedAssistant {
    pub answer: Option<String>,
}

#[async_trait]
impl SupportAssistant for CannedAssistant {
    async fn ask(&self, _query: &str, context: &str) -> Result<String, AssistantError> {
        match &self.answer {
            Some(answer) => Ok(format!("{answer} ({} chars of context)", context.len())),
            None => Err(AssistantError::Upstream("connection refused".to_string())),
        }
    }
}

pub struct TestApp {
    pub deployment: DeploymentImpl,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_assistant(Some("Respuesta".to_string())).await
    }

    pub async fn with_assistant(answer: Option<String>) -> Self {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&pool, None).await.unwrap();

        let config = Config::default();
        let mailer = Arc::new(RecordingMailer::default());
        let notifications = NotificationService::new(mailer.clone(), config.public_base_url.clone());
        let assistant = AssistantService::new(Arc::new(CannedAssistant { answer }), 1_000);

        let deployment = DeploymentImpl::with_services(
            config,
            DBService::from_pool(pool),
            notifications,
            assistant,
        );
        Self { deployment, mailer }
    }

    pub fn router(&self) -> Router {
        http::router(self.deployment.clone())
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.mailer.sent.lock().unwrap().clone()
    }

    /// Sends one request and decodes the JSON body (`Value::Null` when empty).
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, text) = self.call_raw(method, uri, body).await;
        let json = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, json)
    }

    pub async fn call_raw(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
