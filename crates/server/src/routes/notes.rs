use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, put},
};
use notetree_core::{Note, TreeNode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub fn notes_routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/tree", get(notes_tree))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/notes/{id}/parent", put(move_note))
}

// Extractor rejections are taken as `Result` so they reach the client as
// `{"detail": ...}` like every other error.

#[derive(Debug, Deserialize)]
struct CreateNoteRequest {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteRequest {
    title: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MoveNoteRequest {
    #[serde(default)]
    parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct DeleteNoteResponse {
    message: &'static str,
    deleted: Vec<i64>,
}

async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.run(|app| Ok(app.list_notes())).await?;
    Ok(Json(notes))
}

async fn notes_tree(State(state): State<AppState>) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let tree = state.run(|app| app.notes_tree()).await?;
    Ok(Json(tree))
}

async fn get_note(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Note>, ApiError> {
    let Path(id) = path?;
    let note = state.run(move |app| app.get_note(id)).await?;
    Ok(Json(note))
}

async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(req) = payload?;
    let note = state
        .run(move |app| app.create_note(&req.title, &req.content, req.parent_id))
        .await?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let note = state
        .run(move |app| app.update_note(id, &req.title, &req.content))
        .await?;
    Ok(Json(note))
}

async fn move_note(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MoveNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let note = state.run(move |app| app.move_note(id, req.parent_id)).await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
    let Path(id) = path?;
    let deleted = state.run(move |app| app.delete_note(id)).await?;
    Ok(Json(DeleteNoteResponse {
        message: "Note deleted successfully",
        deleted,
    }))
}
