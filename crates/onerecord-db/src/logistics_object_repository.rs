use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use onerecord_core::error::AppError;
use onerecord_core::logistics::LogisticsObjectType;
use onerecord_core::models::{LogisticsObject, NewLogisticsObject};

use crate::error::db_error;

/// Repository for logistics objects owned by companies on this server.
#[derive(Clone)]
pub struct LogisticsObjectRepository {
    pool: Pool<Postgres>,
}

impl LogisticsObjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, lo: &NewLogisticsObject) -> Result<LogisticsObject, AppError> {
        let row = sqlx::query_as::<_, LogisticsObjectRow>(
            r#"
            INSERT INTO logistics_objects (id, company_id, lo_type, document)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, lo_type, document, created_at, updated_at
            "#,
        )
        .bind(lo.id)
        .bind(&lo.company_id)
        .bind(lo.lo_type.as_str())
        .bind(&lo.document)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!(
            id = %lo.id,
            company_id = %lo.company_id,
            lo_type = %lo.lo_type,
            "Logistics object stored"
        );
        LogisticsObject::try_from(row)
    }

    pub async fn get(
        &self,
        company_id: &str,
        id: Uuid,
    ) -> Result<Option<LogisticsObject>, AppError> {
        let row = sqlx::query_as::<_, LogisticsObjectRow>(
            r#"
            SELECT id, company_id, lo_type, document, created_at, updated_at
            FROM logistics_objects
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(LogisticsObject::try_from).transpose()
    }

    /// List a company's logistics objects, newest first, optionally by type.
    pub async fn list(
        &self,
        company_id: &str,
        lo_type: Option<LogisticsObjectType>,
        limit: usize,
    ) -> Result<Vec<LogisticsObject>, AppError> {
        let rows = sqlx::query_as::<_, LogisticsObjectRow>(
            r#"
            SELECT id, company_id, lo_type, document, created_at, updated_at
            FROM logistics_objects
            WHERE company_id = $1 AND ($2::VARCHAR IS NULL OR lo_type = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(company_id)
        .bind(lo_type.map(|t| t.as_str()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(LogisticsObject::try_from).collect()
    }

    /// Replace the document of an existing logistics object.
    ///
    /// Returns `None` if the object does not exist for this company.
    pub async fn replace(
        &self,
        company_id: &str,
        id: Uuid,
        document: &serde_json::Value,
    ) -> Result<Option<LogisticsObject>, AppError> {
        let row = sqlx::query_as::<_, LogisticsObjectRow>(
            r#"
            UPDATE logistics_objects
            SET document = $3, updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING id, company_id, lo_type, document, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(document)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(LogisticsObject::try_from).transpose()
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct LogisticsObjectRow {
    id: Uuid,
    company_id: String,
    lo_type: String,
    document: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LogisticsObjectRow> for LogisticsObject {
    type Error = AppError;

    fn try_from(row: LogisticsObjectRow) -> Result<Self, Self::Error> {
        Ok(LogisticsObject {
            id: row.id,
            company_id: row.company_id,
            lo_type: row.lo_type.parse::<LogisticsObjectType>().map_err(AppError::DatabaseError)?,
            document: row.document,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
