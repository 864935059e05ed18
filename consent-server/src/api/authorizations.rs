use crate::auth::RequestContext;
use crate::consent::{parse_scope_list, ConsentError, Scope};
use crate::errors::{ApiError, NOT_FOUND};
use crate::openapi::CONSENT_TAG;
use crate::policy::AUTHORIZATIONS_PATH;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

/// Query parameters of `GET /authorizations`
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct AuthorizationsQuery {
    /// Identity that granted the consent
    id: Option<String>,
    /// Application the consent was granted to
    app: Option<String>,
    /// Client that acted on behalf of the application
    client_id: Option<String>,
    /// Comma-separated scopes to filter by
    scope: Option<String>,
}

/// Consent change for one identity and application
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub(crate) struct ConsentRequest {
    /// Identity granting the consent
    #[serde(default)]
    sub: Option<String>,
    /// Application receiving the consent
    #[serde(default)]
    app: Option<String>,
    /// Client that acted on behalf of the application
    #[serde(default)]
    client_id: Option<String>,
    /// Scopes to grant
    #[serde(default)]
    granted_scopes: Vec<String>,
    /// Scopes to revoke
    #[serde(default)]
    revoked_scopes: Vec<String>,
    /// Scopes the application asked for; must not be empty
    #[serde(default)]
    requested_scopes: Vec<String>,
}

/// Returns the scopes the identity granted to the application
#[utoipa::path(
    get,
    path = "/authorizations",
    tag = CONSENT_TAG,
    params(AuthorizationsQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Granted scopes", body = Vec<String>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Access token lacks the required scopes"),
        (status = 404, description = "No matching consent or missing query parameter")
    )
)]
pub(crate) async fn get_authorizations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<AuthorizationsQuery>,
) -> Result<Json<Vec<Scope>>, ApiError> {
    debug!("[{}] GET {}", ctx.request_id, AUTHORIZATIONS_PATH);
    // an empty `scope` means no filter
    let requested = query
        .scope
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_scope_list);

    let granted = state
        .consents
        .fetch_grants(
            &ctx,
            query.id.as_deref().unwrap_or_default(),
            query.app.as_deref().unwrap_or_default(),
            query.client_id.as_deref().unwrap_or_default(),
            requested.as_ref(),
        )
        .await
        .map_err(|e| match e {
            ConsentError::MissingRequiredField(field) => ApiError::not_found(format!(
                "Not found. Hint: Are you missing {} in request?",
                field.query_name()
            )),
            other => ApiError::from(other),
        })?;

    if granted.is_empty() {
        debug!("[{}] No matching consent", ctx.request_id);
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(Json(granted))
}

/// Grants and revokes scopes and returns the resulting granted scopes
#[utoipa::path(
    post,
    path = "/authorizations",
    tag = CONSENT_TAG,
    request_body = ConsentRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Granted scopes after the change", body = Vec<String>),
        (status = 400, description = "Invalid request payload"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Access token lacks the required scopes"),
        (status = 404, description = "The consent could not be stored")
    )
)]
pub(crate) async fn post_authorizations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ConsentRequest>, JsonRejection>,
) -> Result<Json<Vec<Scope>>, ApiError> {
    debug!("[{}] POST {}", ctx.request_id, AUTHORIZATIONS_PATH);
    let Json(request) = payload.map_err(|rejection| {
        debug!("[{}] Invalid body: {}", ctx.request_id, rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;

    if request.requested_scopes.is_empty() {
        return Err(ApiError::bad_request("Missing requested_scopes"));
    }

    let granted = state
        .consents
        .apply_consent(
            &ctx,
            request.sub.as_deref().unwrap_or_default(),
            request.app.as_deref().unwrap_or_default(),
            request.client_id.as_deref().unwrap_or_default(),
            request.granted_scopes,
            request.revoked_scopes,
        )
        .await?;
    Ok(Json(granted))
}

/// Acknowledges an update request without changing any consent
#[utoipa::path(
    put,
    path = "/authorizations",
    tag = CONSENT_TAG,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Access token lacks the required scopes")
    )
)]
pub(crate) async fn put_authorizations(Extension(ctx): Extension<RequestContext>) -> Response {
    debug!("[{}] PUT {}", ctx.request_id, AUTHORIZATIONS_PATH);
    (StatusCode::OK, Json(json!({ "message": "pong" }))).into_response()
}

/// Consent routes, all protected by authentication and route policy
pub(super) fn router() -> Router<AppState> {
    Router::new().route(
        AUTHORIZATIONS_PATH,
        get(get_authorizations)
            .post(post_authorizations)
            .put(put_authorizations),
    )
}
