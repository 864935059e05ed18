use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const CONSENT_TAG: &str = "Consent API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health::health_check,
        crate::api::health::ready_check,
        crate::api::authorizations::get_authorizations,
        crate::api::authorizations::post_authorizations,
        crate::api::authorizations::put_authorizations,
    ),
    components(schemas(crate::api::authorizations::ConsentRequest)),
    modifiers(&BearerAuth),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = CONSENT_TAG, description = "Consent read and write endpoints"),
    ),
    info(
        title = "Consent API",
        description = "OAuth2 consent and authorization microservice",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Registers the bearer access token security scheme
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Serves the OpenAPI JSON document
pub(crate) fn router(api_doc: utoipa::openapi::OpenApi) -> Router<AppState> {
    Router::new().route(
        "/openapi.json",
        get(move || {
            let api_doc = api_doc.clone();
            async move { Json(api_doc) }
        }),
    )
}
