use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use onerecord_core::error::AppError;

use crate::config::Environment;
use crate::dto::ErrorResponse;
use crate::state::AppState;

/// Largest plain-text error body read back when re-rendering framework errors.
const MAX_PLAIN_ERROR_BODY: usize = 16 * 1024;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::SerializationError(_) => (StatusCode::BAD_REQUEST, "serialization_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Error information attached to a response for [`render_errors`] to format.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    pub detail: String,
}

impl ErrorReport {
    /// Build a report for an error response that did not come from [`ApiError`]
    /// (extractor rejections, method mismatches, body limits).
    fn from_plain(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let reason = status.canonical_reason().unwrap_or("Error").to_string();
        let message = if text.is_empty() { reason } else { text };

        Self {
            kind: kind_for_status(status),
            detail: format!("{} {}", status.as_u16(), message),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let report = ErrorReport {
            kind,
            message: self.0.to_string(),
            detail: format!("{:?}", self.0),
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

fn kind_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::METHOD_NOT_ALLOWED => "method_not_allowed",
        StatusCode::CONFLICT => "conflict",
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable_entity",
        s if s.is_server_error() => "internal_error",
        _ => "client_error",
    }
}

impl ErrorResponse {
    /// Format a report for the given environment.
    ///
    /// Detail is only exposed in development; outside development, server
    /// errors also lose their message in favour of the reason phrase.
    pub fn from_report(status: StatusCode, report: ErrorReport, env: Environment) -> Self {
        let message = if status.is_server_error() && !env.is_development() {
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            report.message
        };

        Self {
            error: report.kind.to_string(),
            message,
            status: status.as_u16(),
            detail: env.is_development().then_some(report.detail),
        }
    }
}

/// Middleware that renders every 4xx/5xx response as an [`ErrorResponse`].
pub async fn render_errors(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let report = match parts.extensions.remove::<ErrorReport>() {
        Some(report) => report,
        None => {
            let bytes = axum::body::to_bytes(body, MAX_PLAIN_ERROR_BODY)
                .await
                .unwrap_or_default();
            ErrorReport::from_plain(status, &bytes)
        }
    };

    let body = ErrorResponse::from_report(status, report, state.config.environment);

    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let mut rendered = (status, axum::Json(body)).into_response();
    rendered.headers_mut().extend(parts.headers);
    rendered
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(AppError::NotFound(format!("Not Found: {}", uri.path())))
}

/// Turn a handler panic into a 500 that goes through [`render_errors`].
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError(AppError::Generic(format!("Handler panicked: {detail}"))).into_response()
}
