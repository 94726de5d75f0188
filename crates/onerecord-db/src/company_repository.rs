use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};

use onerecord_core::error::AppError;
use onerecord_core::models::{Company, NewCompany};

use crate::error::{db_error, is_unique_violation};

/// Repository for company persistence in PostgreSQL.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: Pool<Postgres>,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a company. Fails with [`AppError::Conflict`] if the id is taken.
    pub async fn create(&self, company: &NewCompany) -> Result<Company, AppError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (company_id, company_name, company_pin_hash)
            VALUES ($1, $2, $3)
            RETURNING company_id, company_name, company_pin_hash, created_at
            "#,
        )
        .bind(&company.company_id)
        .bind(&company.company_name)
        .bind(&company.company_pin_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Company already exists: {}", company.company_id))
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(company_id = %company.company_id, "Company created");
        Ok(row.into())
    }

    pub async fn get(&self, company_id: &str) -> Result<Option<Company>, AppError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_id, company_name, company_pin_hash, created_at
            FROM companies
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    /// List companies, oldest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<Company>, AppError> {
        let rows = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_id, company_name, company_pin_hash, created_at
            FROM companies
            ORDER BY created_at ASC, company_id ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CompanyRow {
    company_id: String,
    company_name: String,
    company_pin_hash: String,
    created_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            company_id: row.company_id,
            company_name: row.company_name,
            company_pin_hash: row.company_pin_hash,
            created_at: row.created_at,
        }
    }
}
