use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use uuid::Uuid;

use onerecord_core::{AppError, LogisticsObjectType};

use crate::auth::require_jwt;
use crate::dto::{InboundListQuery, InboundListResponse, InboundLogisticsObjectResponse};
use crate::error::ApiError;
use crate::routes::page_limit;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_received))
        .route("/{id}", get(get_received))
        .route_layer(middleware::from_fn_with_state(state, require_jwt))
}

#[utoipa::path(
    get,
    path = "/losFromPublishers",
    params(InboundListQuery),
    responses(
        (status = 200, description = "Logistics objects received from publishers", body = InboundListResponse),
        (status = 400, description = "Unknown topic", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearerAuth" = [])),
    tag = "losFromPublishers"
)]
pub async fn list_received(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InboundListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let topic = query
        .topic
        .as_deref()
        .map(str::parse::<LogisticsObjectType>)
        .transpose()
        .map_err(AppError::ValidationError)?;

    let received = state
        .db
        .inbound_repo()
        .list(topic, page_limit(query.limit))
        .await?;

    let logistics_objects: Vec<InboundLogisticsObjectResponse> =
        received.into_iter().map(Into::into).collect();
    let total = logistics_objects.len();

    Ok(axum::Json(InboundListResponse {
        logistics_objects,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/losFromPublishers/{id}",
    params(("id" = Uuid, Path, description = "Received logistics object ID")),
    responses(
        (status = 200, description = "The received logistics object", body = InboundLogisticsObjectResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearerAuth" = [])),
    tag = "losFromPublishers"
)]
pub async fn get_received(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let received = state
        .db
        .inbound_repo()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Received logistics object not found: {id}")))?;

    Ok(axum::Json(InboundLogisticsObjectResponse::from(received)))
}
