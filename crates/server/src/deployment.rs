use std::sync::Arc;

use db::{DBService, DbErr};
use services::services::{
    assistant::AssistantService,
    config::{Config, ConfigError, load_config_from_file, save_config_to_file},
    email::mailer_from_config,
    notification::NotificationService,
};
use thiserror::Error;
use utils::assets::{config_path, ensure_asset_dir};

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a request handler needs: the store, the runtime config and the
/// two outbound collaborators.
#[derive(Clone)]
pub struct AppDeployment {
    config: Arc<Config>,
    db: DBService,
    notifications: NotificationService,
    assistant: AssistantService,
}

impl AppDeployment {
    pub async fn new() -> Result<Self, DeploymentError> {
        ensure_asset_dir()?;
        let config = load_runtime_config().await?;

        let db = match config.database_url.as_deref() {
            Some(database_url) => DBService::connect(database_url).await?,
            None => DBService::new().await?,
        };

        Ok(Self::from_parts(config, db))
    }

    /// Builds the mailer and assistant from `config`.
    pub fn from_parts(config: Config, db: DBService) -> Self {
        let notifications = NotificationService::new(
            mailer_from_config(&config.mail),
            config.public_base_url.clone(),
        );
        let assistant = AssistantService::from_config(&config.ai);
        Self::with_services(config, db, notifications, assistant)
    }

    pub fn with_services(
        config: Config,
        db: DBService,
        notifications: NotificationService,
        assistant: AssistantService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            notifications,
            assistant,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}

/// Loads `config.json`, writes back the normalized file, then layers the
/// environment on top. Secrets taken from the environment never reach disk.
async fn load_runtime_config() -> Result<Config, DeploymentError> {
    let path = config_path();
    let config = load_config_from_file(&path).await;
    save_config_to_file(&config, &path).await?;

    let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
    tracing::debug!(
        config_path = %path.display(),
        provider = %config.ai.provider,
        mail_relay = config.mail.relay_url.is_some(),
        "runtime config loaded"
    );
    Ok(config)
}
