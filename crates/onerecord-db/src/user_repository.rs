use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};

use onerecord_core::error::AppError;
use onerecord_core::models::{NewUser, User};

use crate::error::{db_error, is_unique_violation};

/// Repository for company users.
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. Usernames are unique per company.
    pub async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (company_id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING company_id, username, password_hash, created_at
            "#,
        )
        .bind(&user.company_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "User {} already exists in company {}",
                    user.username, user.company_id
                ))
            } else {
                db_error(e)
            }
        })?;

        Ok(row.into())
    }

    pub async fn get(&self, company_id: &str, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT company_id, username, password_hash, created_at
            FROM users
            WHERE company_id = $1 AND username = $2
            "#,
        )
        .bind(company_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    pub async fn list(&self, company_id: &str, limit: usize) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT company_id, username, password_hash, created_at
            FROM users
            WHERE company_id = $1
            ORDER BY created_at ASC, username ASC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    company_id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            company_id: row.company_id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
