use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::logistics::LogisticsObjectType;

/// Longest accepted company id.
pub const MAX_COMPANY_ID_LEN: usize = 64;

/// A registered company (tenant).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Company {
    pub company_id: String,
    pub company_name: String,
    #[serde(skip_serializing)]
    pub company_pin_hash: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for inserting a new company. The PIN is already hashed.
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub company_id: String,
    pub company_name: String,
    pub company_pin_hash: String,
}

/// A user belonging to a company.
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub company_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for inserting a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_id: String,
    pub username: String,
    pub password_hash: String,
}

/// A logistics object owned by a company on this server.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LogisticsObject {
    pub id: Uuid,
    pub company_id: String,
    pub lo_type: LogisticsObjectType,
    /// JSON-LD body, `@id` included
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting a new logistics object.
#[derive(Debug, Clone)]
pub struct NewLogisticsObject {
    pub id: Uuid,
    pub company_id: String,
    pub lo_type: LogisticsObjectType,
    pub document: serde_json::Value,
}

/// A logistics object pushed to this server by a publisher.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InboundLogisticsObject {
    pub id: Uuid,
    pub topic: LogisticsObjectType,
    /// `@id` of the document at the publisher, when it carried one
    pub publisher_id: Option<String>,
    pub document: serde_json::Value,
    /// SHA-256 of the document, used to recognise re-deliveries
    pub content_hash: String,
    pub received_at: DateTime<Utc>,
}

/// DTO for inserting a received logistics object.
#[derive(Debug, Clone)]
pub struct NewInboundLogisticsObject {
    pub topic: LogisticsObjectType,
    pub publisher_id: Option<String>,
    pub document: serde_json::Value,
    pub content_hash: String,
}

impl NewInboundLogisticsObject {
    /// Build from a received document, validating its type.
    pub fn from_document(document: serde_json::Value) -> Result<Self, AppError> {
        let topic = crate::logistics::type_of(&document)?;
        let publisher_id = document
            .get("@id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let content_hash = compute_hash(&document.to_string());

        Ok(Self {
            topic,
            publisher_id,
            document,
            content_hash,
        })
    }
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check that a caller-chosen company id is usable as a path segment.
pub fn validate_company_id(company_id: &str) -> Result<(), AppError> {
    if company_id.is_empty() || company_id.len() > MAX_COMPANY_ID_LEN {
        return Err(AppError::ValidationError(format!(
            "companyId must be between 1 and {MAX_COMPANY_ID_LEN} characters"
        )));
    }

    if !company_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::ValidationError(
            "companyId may only contain letters, digits, '-' and '_'".into(),
        ));
    }

    Ok(())
}
