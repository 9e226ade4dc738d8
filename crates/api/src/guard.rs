//! Bearer-token guard for alert routes

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::debug;

/// Reject requests without a valid `Authorization: Bearer` token. Passes
/// everything through when authentication is disabled.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(login) = state.login.as_ref() else {
        return next.run(req).await;
    };

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return ApiError::Unauthorized("Missing bearer token".to_string()).into_response();
    };

    match login.verify(token) {
        Ok(claims) => {
            debug!("Request authorised for {} ({})", claims.name, claims.role);
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
