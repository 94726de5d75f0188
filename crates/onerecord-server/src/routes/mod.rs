//! Router registry: every route group is mounted here under its prefix.

pub mod callback;
pub mod companies;
pub mod index;
pub mod los_from_publishers;
pub mod server_information;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{not_found, panic_response, render_errors};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default and maximum page sizes for list endpoints.
pub(crate) const DEFAULT_LIMIT: usize = 20;
pub(crate) const MAX_LIMIT: usize = 100;

pub(crate) fn page_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Build the full router with all route groups, documentation, and error handling.
pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .merge(index::router())
        .nest("/companies", companies::router(state.clone()))
        .nest("/callbackUrl", callback::router(state.clone()))
        .nest("/losFromPublishers", los_from_publishers::router(state.clone()))
        .nest("/serverInformation", server_information::router())
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()));

    with_error_handling(routes, state)
}

/// Wrap `routes` with the static file fallback, the body limit, panic
/// recovery and error rendering shared by every endpoint.
pub fn with_error_handling(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(not_found.into_service());

    routes
        .fallback_service(static_files)
        // axum's own 2 MiB extractor limit would otherwise undercut the layer below
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), render_errors))
        .with_state(state)
}
