//! Login Route

use crate::error::ApiError;
use crate::state::AppState;
use auth::{AuthError, AuthToken};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Exchange credentials for a token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthToken>, ApiError> {
    let Some(login) = state.login.as_ref() else {
        return Err(AuthError::LoginFailed.into());
    };
    let Ok(Json(request)) = body else {
        return Err(AuthError::InvalidRequest.into());
    };

    let token = login.login(&request.username, &request.password).await?;
    Ok(Json(token))
}
