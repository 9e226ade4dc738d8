//! Alert Routes

use crate::error::ApiError;
use crate::state::AppState;
use alert_model::{Alert, AlertDraft};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Response carrying a single alert
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub status: &'static str,
    pub total: usize,
    pub id: String,
    pub alert: Alert,
}

impl AlertResponse {
    fn new(alert: Alert) -> Self {
        Self {
            status: "ok",
            total: 1,
            id: alert.id.clone(),
            alert,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Submit an alert
pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AlertDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<AlertResponse>), ApiError> {
    let Json(draft) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let id = state.alerts.process_alert(&draft).await?;
    let alert = state.alerts.get_alert(&id).await?;
    Ok((StatusCode::CREATED, Json(AlertResponse::new(alert))))
}

/// Get a single alert
pub async fn get_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alert = state.alerts.get_alert(&id).await?;
    Ok(Json(AlertResponse::new(alert)))
}

/// Delete an alert
pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.alerts.delete_alert(&id).await?;
    Ok(Json(StatusResponse { status: "ok" }))
}
