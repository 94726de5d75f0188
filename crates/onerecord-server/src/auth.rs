use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use onerecord_core::credentials::{hash_secret, verify_secret};
use onerecord_core::subscription::SUBSCRIPTION_SECRET_HEADER;
use onerecord_core::{AppError, Claims};

use crate::error::ApiError;
use crate::state::AppState;

/// Constant-time comparison so secret checks do not leak timing.
fn secrets_match(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that validates a `Authorization: Bearer <jwt>` access token and
/// makes its [`Claims`] available to handlers as an extension.
pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(request.headers()).ok_or_else(|| {
            AppError::Unauthorized(
                "Missing or invalid Authorization header. Expected: Bearer <token>".into(),
            )
        })?;
        state.tokens.verify(token)?
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Middleware guarding server-wide endpoints with `Authorization: Bearer <serverSecret>`.
pub async fn require_server_secret(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.server_secret.as_deref() else {
        return Err(AppError::Forbidden(
            "Server secret not configured. Set ONE_RECORD_SERVER_SECRET to enable this endpoint."
                .into(),
        )
        .into());
    };

    let authenticated =
        bearer_token(request.headers()).is_some_and(|given| secrets_match(given, expected));

    if !authenticated {
        return Err(AppError::Unauthorized(
            "Missing or invalid Authorization header. Expected: Bearer <serverSecret>".into(),
        )
        .into());
    }

    Ok(next.run(request).await)
}

/// Middleware checking the subscription secret publishers send with each delivery.
pub async fn require_subscription_secret(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.subscription_secret.as_deref() else {
        return Err(AppError::Forbidden(
            "This server does not accept published logistics objects".into(),
        )
        .into());
    };

    let authenticated = request
        .headers()
        .get(SUBSCRIPTION_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|given| secrets_match(given, expected));

    if !authenticated {
        tracing::warn!("Callback rejected: missing or invalid subscription secret");
        return Err(AppError::Unauthorized(format!(
            "Missing or invalid {SUBSCRIPTION_SECRET_HEADER} header"
        ))
        .into());
    }

    Ok(next.run(request).await)
}

/// Ensure the token holder belongs to the company addressed by the request.
pub fn authorize_company(claims: &Claims, company_id: &str) -> Result<(), ApiError> {
    if claims.company_id != company_id {
        return Err(AppError::Forbidden(format!(
            "Token does not grant access to company {company_id}"
        ))
        .into());
    }
    Ok(())
}

/// Hash a password or PIN on the blocking pool.
pub async fn hash_blocking(secret: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_secret(&secret, cost))
        .await
        .map_err(|e| AppError::CredentialError(format!("Hashing task failed: {e}")))?
}

/// Verify a password or PIN on the blocking pool.
pub async fn verify_blocking(secret: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_secret(&secret, &hash))
        .await
        .map_err(|e| AppError::CredentialError(format!("Verification task failed: {e}")))?
}
