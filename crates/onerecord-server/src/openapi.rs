use utoipa::OpenApi;
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};

use onerecord_core::subscription::SUBSCRIPTION_SECRET_HEADER;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ONE Record Server",
        version = "3.0.0",
        description = include_str!("../docs/api-description.md")
    ),
    paths(
        crate::routes::index::index,
        crate::routes::index::health,
        crate::routes::companies::create_company,
        crate::routes::companies::list_companies,
        crate::routes::companies::get_company,
        crate::routes::companies::create_user,
        crate::routes::companies::list_users,
        crate::routes::companies::login,
        crate::routes::companies::create_logistics_object,
        crate::routes::companies::list_logistics_objects,
        crate::routes::companies::get_logistics_object,
        crate::routes::companies::replace_logistics_object,
        crate::routes::callback::receive_logistics_object,
        crate::routes::los_from_publishers::list_received,
        crate::routes::los_from_publishers::get_received,
        crate::routes::server_information::server_information,
    ),
    components(schemas(
        crate::dto::IndexResponse,
        crate::dto::HealthResponse,
        crate::dto::CreateCompanyRequest,
        crate::dto::CompanyResponse,
        crate::dto::CompanyListResponse,
        crate::dto::CreateUserRequest,
        crate::dto::UserResponse,
        crate::dto::UserListResponse,
        crate::dto::LoginRequest,
        crate::dto::LoginResponse,
        crate::dto::LogisticsObjectBody,
        crate::dto::LogisticsObjectListResponse,
        crate::dto::CallbackReceipt,
        crate::dto::InboundLogisticsObjectResponse,
        crate::dto::InboundListResponse,
        crate::dto::SubscriptionResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "index", description = "Server banner and health"),
        (name = "companies", description = "Companies, users and their logistics objects"),
        (name = "callback", description = "Logistics objects pushed by publishers"),
        (name = "losFromPublishers", description = "Logistics objects received from publishers"),
        (name = "serverInformation", description = "Subscription information for publishers"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the security schemes referenced by the route annotations.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "A valid JWT must be passed in the Authorization header, as \
                             `Bearer yourtoken`. Tokens are returned by \
                             `POST /companies/yourCompanyId/users/login` for a valid username \
                             and password and are valid for 72 hours by default.",
                        ))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "serverSecret",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Server secret configured via ONE_RECORD_SERVER_SECRET.",
                        ))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "subscriptionSecret",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    SUBSCRIPTION_SECRET_HEADER,
                    "Subscription secret configured via ONE_RECORD_SUBSCRIPTION_SECRET.",
                ))),
            );
        }
    }
}
