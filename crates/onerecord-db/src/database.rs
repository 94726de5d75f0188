use onerecord_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::company_repository::CompanyRepository;
use crate::config::DatabaseConfig;
use crate::error::db_error;
use crate::inbound_repository::InboundRepository;
use crate::logistics_object_repository::LogisticsObjectRepository;
use crate::user_repository::UserRepository;

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = Self::pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Build the pool without opening a connection.
    ///
    /// Connections are established on first use, so a database that is down
    /// at startup surfaces as errors on the requests that need it.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = Self::pool_options(config)
            .connect_lazy(&config.url)
            .map_err(|e| AppError::ConfigError(format!("Invalid DATABASE_URL: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Get a [`CompanyRepository`] backed by this pool.
    pub fn company_repo(&self) -> CompanyRepository {
        CompanyRepository::new(self.pool.clone())
    }

    /// Get a [`UserRepository`] backed by this pool.
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a [`LogisticsObjectRepository`] backed by this pool.
    pub fn logistics_object_repo(&self) -> LogisticsObjectRepository {
        LogisticsObjectRepository::new(self.pool.clone())
    }

    /// Get an [`InboundRepository`] backed by this pool.
    pub fn inbound_repo(&self) -> InboundRepository {
        InboundRepository::new(self.pool.clone())
    }
}
