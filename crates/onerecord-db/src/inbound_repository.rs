use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use onerecord_core::error::AppError;
use onerecord_core::logistics::LogisticsObjectType;
use onerecord_core::models::{InboundLogisticsObject, NewInboundLogisticsObject};

use crate::error::db_error;

/// Result of storing a delivery from a publisher.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// First delivery of this document.
    Created(InboundLogisticsObject),
    /// The same document was already received from the same publisher.
    Duplicate(InboundLogisticsObject),
}

impl SaveOutcome {
    pub fn into_inner(self) -> InboundLogisticsObject {
        match self {
            SaveOutcome::Created(lo) | SaveOutcome::Duplicate(lo) => lo,
        }
    }
}

/// Repository for logistics objects received on the callback URL.
#[derive(Clone)]
pub struct InboundRepository {
    pool: Pool<Postgres>,
}

impl InboundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a delivery unless an identical one from the same publisher exists.
    pub async fn save(&self, lo: &NewInboundLogisticsObject) -> Result<SaveOutcome, AppError> {
        let inserted = sqlx::query_as::<_, InboundRow>(
            r#"
            INSERT INTO inbound_logistics_objects (topic, publisher_id, document, content_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING id, topic, publisher_id, document, content_hash, received_at
            "#,
        )
        .bind(lo.topic.as_str())
        .bind(&lo.publisher_id)
        .bind(&lo.document)
        .bind(&lo.content_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(row) = inserted {
            return Ok(SaveOutcome::Created(InboundLogisticsObject::try_from(row)?));
        }

        let existing = sqlx::query_as::<_, InboundRow>(
            r#"
            SELECT id, topic, publisher_id, document, content_hash, received_at
            FROM inbound_logistics_objects
            WHERE content_hash = $1 AND COALESCE(publisher_id, '') = COALESCE($2, '')
            "#,
        )
        .bind(&lo.content_hash)
        .bind(&lo.publisher_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!(content_hash = %lo.content_hash, "Duplicate delivery ignored");
        Ok(SaveOutcome::Duplicate(InboundLogisticsObject::try_from(existing)?))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<InboundLogisticsObject>, AppError> {
        let row = sqlx::query_as::<_, InboundRow>(
            r#"
            SELECT id, topic, publisher_id, document, content_hash, received_at
            FROM inbound_logistics_objects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(InboundLogisticsObject::try_from).transpose()
    }

    /// List received objects, newest first, optionally for one topic.
    pub async fn list(
        &self,
        topic: Option<LogisticsObjectType>,
        limit: usize,
    ) -> Result<Vec<InboundLogisticsObject>, AppError> {
        let rows = sqlx::query_as::<_, InboundRow>(
            r#"
            SELECT id, topic, publisher_id, document, content_hash, received_at
            FROM inbound_logistics_objects
            WHERE ($1::VARCHAR IS NULL OR topic = $1)
            ORDER BY received_at DESC
            LIMIT $2
            "#,
        )
        .bind(topic.map(|t| t.as_str()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(InboundLogisticsObject::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct InboundRow {
    id: Uuid,
    topic: String,
    publisher_id: Option<String>,
    document: serde_json::Value,
    content_hash: String,
    received_at: DateTime<Utc>,
}

impl TryFrom<InboundRow> for InboundLogisticsObject {
    type Error = AppError;

    fn try_from(row: InboundRow) -> Result<Self, Self::Error> {
        Ok(InboundLogisticsObject {
            id: row.id,
            topic: row.topic.parse::<LogisticsObjectType>().map_err(AppError::DatabaseError)?,
            publisher_id: row.publisher_id,
            document: row.document,
            content_hash: row.content_hash,
            received_at: row.received_at,
        })
    }
}
