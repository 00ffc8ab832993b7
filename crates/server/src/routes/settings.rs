use std::path::PathBuf;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, routing::get};
use notetree_core::Settings;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

#[derive(Debug, Deserialize)]
struct SettingsUpdate {
    notes_directory: PathBuf,
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    let settings = state.run(|app| Ok(app.settings().clone())).await?;
    Ok(Json(settings))
}

/// Changing the directory migrates every note before responding.
async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(req) = payload?;
    if req.notes_directory.as_os_str().is_empty() {
        return Err(ApiError::BadRequest(
            "notes_directory must not be empty".to_string(),
        ));
    }

    let settings = state
        .run(move |app| {
            app.update_settings(Settings {
                notes_directory: req.notes_directory,
            })
        })
        .await?;
    Ok(Json(settings))
}
