//! Health check endpoint

use axum::extract::State;
use axum::{Json, Router, routing::get};
use notetree_core::Health;

use crate::error::ApiError;
use crate::state::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Health>, ApiError> {
    let health = state.run(|app| Ok(app.health())).await?;
    Ok(Json(health))
}
