use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::entity::Entity;
use crate::database::memory::MemoryDatabase;
use crate::database::repository::Repository;
use crate::database::transaction::Tx;

/// Errors from the entity store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or foreign key violation; carries the constraint name
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// True if this is a violation of the named constraint
    pub fn is_constraint(&self, name: &str) -> bool {
        matches!(self, DatabaseError::ConstraintViolation(c) if c == name)
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                DatabaseError::ConstraintViolation(db_err.constraint().unwrap_or("unknown").to_string())
            }
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Handle to the entity store. Cheap to clone; shared by every request.
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Memory(MemoryDatabase),
}

impl Database {
    /// Connect using the configured URL; an empty URL selects the memory store
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_empty() {
            info!("DATABASE_URL not set, using in-process memory store");
            return Ok(Self::memory());
        }

        if !(config.url.starts_with("postgres://") || config.url.starts_with("postgresql://")) {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(Database::Postgres(pool))
    }

    pub fn memory() -> Self {
        Database::Memory(MemoryDatabase::new())
    }

    pub fn repo<E: Entity>(&self) -> Repository<E> {
        Repository::new(self.clone())
    }

    /// Begin a unit of work. Uncommitted work is discarded when the Tx is dropped.
    pub async fn begin(&self) -> Result<Tx, DatabaseError> {
        match self {
            Database::Postgres(pool) => Ok(Tx::Postgres(pool.begin().await?)),
            Database::Memory(memory) => Ok(Tx::Memory(memory.begin().await)),
        }
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        match self {
            Database::Postgres(pool) => {
                sqlx::migrate!("./migrations").run(pool).await?;
                info!("Database migrations applied");
                Ok(())
            }
            Database::Memory(_) => Ok(()),
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match self {
            Database::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Database::Memory(_) => Ok(()),
        }
    }

    pub async fn close(&self) {
        if let Database::Postgres(pool) = self {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
