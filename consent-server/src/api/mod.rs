mod authn_middleware;
pub(crate) mod authorizations;
mod authz_middleware;
pub(crate) mod health;
pub(crate) mod request_id;

use crate::api::authn_middleware::authentication_middleware;
use crate::api::authz_middleware::authorization_middleware;
use crate::errors::{ApiError, NOT_FOUND};
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(protected_routes(state))
}

/// Creates a router for protected routes that require a bearer access token
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(authorizations::router())
        // route_layer so the policy lookup sees the matched route
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorization_middleware,
        ))
        .fallback(not_found)
        // we must use layer here and not route_layer because, route_layer only
        // affects routes that are defined on the router which doesn't affect fallback
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ))
}

async fn not_found() -> ApiError {
    ApiError::not_found(NOT_FOUND)
}
