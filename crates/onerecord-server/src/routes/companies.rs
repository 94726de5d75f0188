use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Router};
use uuid::Uuid;

use onerecord_core::logistics::type_of;
use onerecord_core::models::{NewCompany, NewLogisticsObject, NewUser, validate_company_id};
use onerecord_core::{AppError, Claims, LogisticsObjectType};

use crate::auth::{
    authorize_company, hash_blocking, require_jwt, require_server_secret, verify_blocking,
};
use crate::dto::{
    CompanyListResponse, CompanyResponse, CreateCompanyRequest, CreateUserRequest,
    ListLogisticsObjectsQuery, ListQuery, LoginRequest, LoginResponse, LogisticsObjectBody,
    LogisticsObjectListResponse, UserListResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::routes::page_limit;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/", post(create_company))
        .route("/{company_id}/users", post(create_user))
        .route("/{company_id}/users/login", post(login))
        .route("/{company_id}/los/{lo_id}", get(get_logistics_object));

    let admin = Router::new()
        .route("/", get(list_companies))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_server_secret,
        ));

    let protected = Router::new()
        .route("/{company_id}", get(get_company))
        .route("/{company_id}/users", get(list_users))
        .route(
            "/{company_id}/los",
            post(create_logistics_object).get(list_logistics_objects),
        )
        .route("/{company_id}/los/{lo_id}", put(replace_logistics_object))
        .route_layer(middleware::from_fn_with_state(state, require_jwt));

    public.merge(admin).merge(protected)
}

/// The `@id` a stored logistics object is addressable at.
fn logistics_object_iri(state: &AppState, company_id: &str, id: Uuid) -> Result<String, AppError> {
    state
        .config
        .public_url
        .join(&format!("companies/{company_id}/los/{id}"))
        .map(String::from)
        .map_err(|e| AppError::ConfigError(format!("Invalid public URL: {e}")))
}

/// Validate a submitted document and stamp it with its server-assigned `@id`.
fn prepare_document(
    mut document: serde_json::Value,
    iri: String,
) -> Result<(LogisticsObjectType, serde_json::Value), AppError> {
    let lo_type = type_of(&document)?;
    if let Some(object) = document.as_object_mut() {
        object.insert("@id".into(), serde_json::Value::String(iri));
    }
    Ok((lo_type, document))
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/companies",
    request_body(content(
        (CreateCompanyRequest = "application/json"),
        (CreateCompanyRequest = "application/x-www-form-urlencoded"),
    )),
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid companyId or empty companyPin", body = crate::dto::ErrorResponse),
        (status = 409, description = "Company already exists", body = crate::dto::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    JsonOrForm(body): JsonOrForm<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_company_id(&body.company_id)?;

    if body.company_name.trim().is_empty() {
        return Err(AppError::ValidationError("companyName must not be empty".into()).into());
    }
    if body.company_pin.is_empty() {
        return Err(AppError::ValidationError("companyPin must not be empty".into()).into());
    }

    let company_pin_hash = hash_blocking(body.company_pin, state.config.bcrypt_cost).await?;

    let company = state
        .db
        .company_repo()
        .create(&NewCompany {
            company_id: body.company_id,
            company_name: body.company_name.trim().to_string(),
            company_pin_hash,
        })
        .await?;

    tracing::info!(company_id = %company.company_id, "Company created");

    Ok((StatusCode::CREATED, axum::Json(CompanyResponse::from(company))))
}

#[utoipa::path(
    get,
    path = "/companies",
    params(ListQuery),
    responses(
        (status = 200, description = "All companies", body = CompanyListResponse),
        (status = 401, description = "Missing or wrong server secret", body = crate::dto::ErrorResponse),
        (status = 403, description = "No server secret configured", body = crate::dto::ErrorResponse),
    ),
    security(("serverSecret" = [])),
    tag = "companies"
)]
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let companies = state
        .db
        .company_repo()
        .list(page_limit(query.limit))
        .await?;

    let companies: Vec<CompanyResponse> = companies.into_iter().map(Into::into).collect();
    let total = companies.len();

    Ok(axum::Json(CompanyListResponse { companies, total }))
}

#[utoipa::path(
    get,
    path = "/companies/{company_id}",
    params(("company_id" = String, Path, description = "Company identifier")),
    responses(
        (status = 200, description = "Company details", body = CompanyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Token belongs to another company"),
        (status = 404, description = "Company not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearerAuth" = [])),
    tag = "companies"
)]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, &company_id)?;

    let company = state
        .db
        .company_repo()
        .get(&company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company not found: {company_id}")))?;

    Ok(axum::Json(CompanyResponse::from(company)))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/companies/{company_id}/users",
    params(("company_id" = String, Path, description = "Company identifier")),
    request_body(content(
        (CreateUserRequest = "application/json"),
        (CreateUserRequest = "application/x-www-form-urlencoded"),
    )),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Empty username or password", body = crate::dto::ErrorResponse),
        (status = 403, description = "Wrong companyPin", body = crate::dto::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::dto::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
    JsonOrForm(body): JsonOrForm<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return Err(
            AppError::ValidationError("username and password must not be empty".into()).into(),
        );
    }

    let company = state
        .db
        .company_repo()
        .get(&company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company not found: {company_id}")))?;

    if !verify_blocking(body.company_pin, company.company_pin_hash).await? {
        tracing::warn!(%company_id, "User creation rejected: wrong company PIN");
        return Err(AppError::Forbidden("Invalid companyPin".into()).into());
    }

    let password_hash = hash_blocking(body.password, state.config.bcrypt_cost).await?;

    let user = state
        .db
        .user_repo()
        .create(&NewUser {
            company_id,
            username,
            password_hash,
        })
        .await?;

    tracing::info!(company_id = %user.company_id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, axum::Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/companies/{company_id}/users",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Users of the company", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Token belongs to another company"),
    ),
    security(("bearerAuth" = [])),
    tag = "companies"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, &company_id)?;

    let users = state
        .db
        .user_repo()
        .list(&company_id, page_limit(query.limit))
        .await?;

    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    let total = users.len();

    Ok(axum::Json(UserListResponse { users, total }))
}

#[utoipa::path(
    post,
    path = "/companies/{company_id}/users/login",
    params(("company_id" = String, Path, description = "Company identifier")),
    request_body(content(
        (LoginRequest = "application/json"),
        (LoginRequest = "application/x-www-form-urlencoded"),
    )),
    responses(
        (status = 200, description = "Access token", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = crate::dto::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
    JsonOrForm(body): JsonOrForm<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let Some(user) = state
        .db
        .user_repo()
        .get(&company_id, body.username.trim())
        .await?
    else {
        let dummy = state.dummy_hash().await?.to_string();
        verify_blocking(body.password, dummy).await?;
        return Err(invalid().into());
    };

    if !verify_blocking(body.password, user.password_hash).await? {
        tracing::warn!(%company_id, username = %user.username, "Login rejected");
        return Err(invalid().into());
    }

    let issued = state.tokens.issue(&user.username, &user.company_id)?;

    tracing::info!(%company_id, username = %user.username, "User logged in");

    Ok(axum::Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
    }))
}

// ---------------------------------------------------------------------------
// Logistics objects
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/companies/{company_id}/los",
    params(("company_id" = String, Path, description = "Company identifier")),
    request_body = LogisticsObjectBody,
    responses(
        (status = 201, description = "Logistics object stored; Location carries its @id", body = LogisticsObjectBody),
        (status = 400, description = "Missing or unknown @type", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Token belongs to another company"),
    ),
    security(("bearerAuth" = [])),
    tag = "companies"
)]
pub async fn create_logistics_object(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<String>,
    axum::Json(document): axum::Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, &company_id)?;

    let id = Uuid::new_v4();
    let iri = logistics_object_iri(&state, &company_id, id)?;
    let (lo_type, document) = prepare_document(document, iri.clone())?;

    let stored = state
        .db
        .logistics_object_repo()
        .create(&NewLogisticsObject {
            id,
            company_id,
            lo_type,
            document,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, iri)],
        axum::Json(stored.document),
    ))
}

#[utoipa::path(
    get,
    path = "/companies/{company_id}/los",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ListLogisticsObjectsQuery,
    ),
    responses(
        (status = 200, description = "Logistics objects of the company", body = LogisticsObjectListResponse),
        (status = 400, description = "Unknown type filter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Token belongs to another company"),
    ),
    security(("bearerAuth" = [])),
    tag = "companies"
)]
pub async fn list_logistics_objects(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(company_id): Path<String>,
    Query(query): Query<ListLogisticsObjectsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, &company_id)?;

    let lo_type = query
        .lo_type
        .as_deref()
        .map(str::parse::<LogisticsObjectType>)
        .transpose()
        .map_err(AppError::ValidationError)?;

    let objects = state
        .db
        .logistics_object_repo()
        .list(&company_id, lo_type, page_limit(query.limit))
        .await?;

    let logistics_objects: Vec<serde_json::Value> =
        objects.into_iter().map(|lo| lo.document).collect();
    let total = logistics_objects.len();

    Ok(axum::Json(LogisticsObjectListResponse {
        logistics_objects,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/companies/{company_id}/los/{lo_id}",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("lo_id" = Uuid, Path, description = "Logistics object ID"),
    ),
    responses(
        (status = 200, description = "The logistics object", body = LogisticsObjectBody),
        (status = 404, description = "Logistics object not found", body = crate::dto::ErrorResponse),
    ),
    tag = "companies"
)]
pub async fn get_logistics_object(
    State(state): State<Arc<AppState>>,
    Path((company_id, lo_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let lo = state
        .db
        .logistics_object_repo()
        .get(&company_id, lo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Logistics object not found: {lo_id}")))?;

    Ok(axum::Json(lo.document))
}

#[utoipa::path(
    put,
    path = "/companies/{company_id}/los/{lo_id}",
    params(
        ("company_id" = String, Path, description = "Company identifier"),
        ("lo_id" = Uuid, Path, description = "Logistics object ID"),
    ),
    request_body = LogisticsObjectBody,
    responses(
        (status = 200, description = "Logistics object replaced", body = LogisticsObjectBody),
        (status = 400, description = "Missing or unknown @type", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Token belongs to another company"),
        (status = 404, description = "Logistics object not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "The @type of a logistics object cannot change", body = crate::dto::ErrorResponse),
    ),
    security(("bearerAuth" = [])),
    tag = "companies"
)]
pub async fn replace_logistics_object(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((company_id, lo_id)): Path<(String, Uuid)>,
    axum::Json(document): axum::Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, &company_id)?;

    let iri = logistics_object_iri(&state, &company_id, lo_id)?;
    let (lo_type, document) = prepare_document(document, iri)?;

    let repo = state.db.logistics_object_repo();
    let existing = repo
        .get(&company_id, lo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Logistics object not found: {lo_id}")))?;

    if existing.lo_type != lo_type {
        return Err(AppError::Conflict(format!(
            "Logistics object {lo_id} is a {}, not a {lo_type}",
            existing.lo_type
        ))
        .into());
    }

    let replaced = repo
        .replace(&company_id, lo_id, &document)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Logistics object not found: {lo_id}")))?;

    tracing::info!(%company_id, %lo_id, "Logistics object replaced");

    Ok(axum::Json(replaced.document))
}
