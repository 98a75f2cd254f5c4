use db_migration::Migrator;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use utils::assets::database_path;

pub mod entities;
pub mod models;
pub mod retry;
pub mod types;

pub use retry::retry_on_sqlite_busy;
pub use sea_orm::{DatabaseConnection as DbPool, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Opens the SQLite file inside the asset directory.
    pub async fn new() -> Result<DBService, DbErr> {
        Self::connect(&default_database_url()).await
    }

    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options.sqlx_logging(false);
        let pool = Database::connect(options).await?;
        Migrator::up(&pool, None).await?;
        tracing::debug!(database_url, "database ready");
        Ok(DBService { pool })
    }

    pub fn from_pool(pool: DbPool) -> DBService {
        DBService { pool }
    }
}

pub fn default_database_url() -> String {
    format!("sqlite://{}?mode=rwc", database_path().to_string_lossy())
}
