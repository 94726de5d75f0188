use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::post;

use onerecord_core::models::NewInboundLogisticsObject;
use onerecord_db::SaveOutcome;

use crate::auth::require_subscription_secret;
use crate::dto::{CallbackReceipt, LogisticsObjectBody};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(receive_logistics_object))
        .route_layer(middleware::from_fn_with_state(
            state,
            require_subscription_secret,
        ))
}

#[utoipa::path(
    post,
    path = "/callbackUrl",
    request_body = LogisticsObjectBody,
    responses(
        (status = 201, description = "Logistics object received", body = CallbackReceipt),
        (status = 200, description = "Already received; nothing stored", body = CallbackReceipt),
        (status = 400, description = "Missing or unknown @type", body = crate::dto::ErrorResponse),
        (status = 401, description = "Missing or wrong subscription secret", body = crate::dto::ErrorResponse),
        (status = 403, description = "This server does not accept published objects", body = crate::dto::ErrorResponse),
    ),
    security(("subscriptionSecret" = [])),
    tag = "callback"
)]
pub async fn receive_logistics_object(
    State(state): State<Arc<AppState>>,
    axum::Json(document): axum::Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let inbound = NewInboundLogisticsObject::from_document(document)?;

    let outcome = state.db.inbound_repo().save(&inbound).await?;
    let (status, duplicate) = match &outcome {
        SaveOutcome::Created(_) => (StatusCode::CREATED, false),
        SaveOutcome::Duplicate(_) => (StatusCode::OK, true),
    };
    let stored = outcome.into_inner();

    tracing::info!(
        id = %stored.id,
        topic = %stored.topic,
        publisher_id = stored.publisher_id.as_deref().unwrap_or("-"),
        duplicate,
        "Logistics object received from publisher"
    );

    Ok((
        status,
        axum::Json(CallbackReceipt {
            id: stored.id,
            topic: stored.topic.to_string(),
            duplicate,
        }),
    ))
}
