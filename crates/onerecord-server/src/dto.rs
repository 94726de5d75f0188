use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use onerecord_core::Subscription;
use onerecord_core::models::{Company, InboundLogisticsObject, User};

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub documentation: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    /// Identifier used in every company URL (letters, digits, '-' and '_')
    pub company_id: String,
    pub company_name: String,
    /// Required later to create users under this company
    pub company_pin: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub company_id: String,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            company_id: c.company_id,
            company_name: c.company_name,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CompanyListResponse {
    pub companies: Vec<CompanyResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// PIN chosen when the company was created
    pub company_pin: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub company_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            company_id: u.company_id,
            username: u.username,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT to send as `Authorization: Bearer <token>`
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Logistics objects
// ---------------------------------------------------------------------------

/// A JSON-LD logistics object. Must carry `@type`: Airwaybill,
/// Housemanifest, Housewaybill or Booking.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LogisticsObjectBody(pub serde_json::Value);

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListLogisticsObjectsQuery {
    /// Only return objects of this type
    #[serde(rename = "type")]
    pub lo_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsObjectListResponse {
    pub logistics_objects: Vec<serde_json::Value>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Publish/subscribe
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackReceipt {
    pub id: Uuid,
    pub topic: String,
    /// True when the same document had already been received
    pub duplicate: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct InboundListQuery {
    pub topic: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboundLogisticsObjectResponse {
    pub id: Uuid,
    pub topic: String,
    pub publisher_id: Option<String>,
    pub content_hash: String,
    pub received_at: DateTime<Utc>,
    pub document: serde_json::Value,
}

impl From<InboundLogisticsObject> for InboundLogisticsObjectResponse {
    fn from(lo: InboundLogisticsObject) -> Self {
        Self {
            id: lo.id,
            topic: lo.topic.to_string(),
            publisher_id: lo.publisher_id,
            content_hash: lo.content_hash,
            received_at: lo.received_at,
            document: lo.document,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboundListResponse {
    pub logistics_objects: Vec<InboundLogisticsObjectResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ServerInformationQuery {
    /// Logistics object type to subscribe to
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub topic: String,
    pub callback_url: String,
    pub secret: String,
    pub subscribe_to_status_updates: bool,
    pub send_logistics_object_body: bool,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            topic: s.topic.to_string(),
            callback_url: s.callback_url,
            secret: s.secret,
            subscribe_to_status_updates: s.subscribe_to_status_updates,
            send_logistics_object_body: s.send_logistics_object_body,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    /// Only present when running in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
