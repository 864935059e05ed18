use crate::api::request_id::RequestId;
use crate::auth::{AuthError, RequestContext};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use log::warn;
use uuid::Uuid;

/// Bearer token authentication middleware.
///
/// On success the request continues with a [`RequestContext`] in its
/// extensions; otherwise it is answered with 401.
pub async fn authentication_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // a header that is not valid UTF-8 counts as absent
    let raw_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let credential = state
        .authenticator
        .authenticate(&request_id, raw_header)
        .inspect_err(|e| {
            warn!(
                "[{}] Rejected request to {} {}: {:?}",
                request_id,
                req.method(),
                req.uri().path(),
                e
            )
        })?;

    req.extensions_mut().insert(RequestContext {
        request_id,
        credential,
    });
    Ok(next.run(req).await)
}
