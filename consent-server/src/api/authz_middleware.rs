use crate::auth::authorizer::{authorize, Decision, DenyReason};
use crate::auth::RequestContext;
use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{debug, error, warn};

const MISSING_SCOPES: &str = "Missing required scopes.";

/// Scope authorization middleware, run after routing so the matched route
/// template is known.
pub async fn authorization_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ctx = req.extensions().get::<RequestContext>();
    let request_id = ctx.map(|ctx| ctx.request_id.as_str()).unwrap_or("-");
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str())
        .unwrap_or_else(|| req.uri().path());
    let required = state.policy.required_scopes(req.method(), path);

    debug!(
        "[{}] Checking scopes for {} {}",
        request_id,
        req.method(),
        path
    );
    match authorize(ctx.map(|ctx| &ctx.credential), required) {
        Ok(Decision::Allow) => {
            debug!("[{}] Required scopes present", request_id);
            next.run(req).await
        }
        Ok(Decision::Deny(reason)) => {
            match &reason {
                DenyReason::MissingScopes(missing) => warn!(
                    "[{}] Denied {} {}: missing scopes {:?}",
                    request_id,
                    req.method(),
                    path,
                    missing
                ),
                other => warn!(
                    "[{}] Denied {} {}: {:?}",
                    request_id,
                    req.method(),
                    path,
                    other
                ),
            }
            ApiError::forbidden(MISSING_SCOPES).into_response()
        }
        Err(e) => {
            error!("[{}] {}", request_id, e);
            ApiError::internal("Internal server error").into_response()
        }
    }
}
