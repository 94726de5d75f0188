use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;

use onerecord_core::{AppError, LogisticsObjectType, Subscription};

use crate::dto::{ServerInformationQuery, SubscriptionResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(server_information))
}

/// Publishers call this before pushing, to learn where and how to deliver.
#[utoipa::path(
    get,
    path = "/serverInformation",
    params(ServerInformationQuery),
    responses(
        (status = 200, description = "Subscription information for the topic", body = SubscriptionResponse),
        (status = 400, description = "Missing or unknown topic", body = crate::dto::ErrorResponse),
        (status = 503, description = "Subscriptions are not enabled on this server", body = crate::dto::ErrorResponse),
    ),
    tag = "serverInformation"
)]
pub async fn server_information(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServerInformationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = query
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "topic query parameter is required: {}",
                LogisticsObjectType::accepted()
            ))
        })?;

    let topic = raw
        .parse::<LogisticsObjectType>()
        .map_err(AppError::ValidationError)?;

    let secret = state
        .config
        .subscription_secret
        .as_deref()
        .ok_or_else(|| {
            AppError::ServiceUnavailable("Subscriptions are not enabled on this server".into())
        })?;

    let subscription = Subscription::for_topic(&state.config.public_url, topic, secret)?;

    Ok(axum::Json(SubscriptionResponse::from(subscription)))
}
