use std::path::Path;

use anyhow::Context;
use axum::Router;
use notetree_core::{NoteApp, Settings, SettingsStore};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::routes::{health_routes, notes_routes, settings_routes};
use crate::state::AppState;

/// Builds the `/api` router around an already opened note app.
///
/// When `static_dir` is given, every non-API path is served from it.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .merge(notes_routes())
        .merge(settings_routes())
        .merge(health_routes());

    let mut app = Router::new().nest("/api", api);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig) -> anyhow::Result<()> {
    let settings_path = config.settings_path()?;
    let defaults = Settings::with_default_path(cfg!(debug_assertions))?;
    let store = SettingsStore::new(&settings_path, defaults);

    let app = NoteApp::open(store).with_context(|| {
        format!(
            "failed to open notes using settings {}",
            settings_path.display()
        )
    })?;

    let health = app.health();
    tracing::info!(
        notes_dir = %health.notes_dir.display(),
        db_path = %health.db_path.display(),
        notes = health.notes_count,
        "note app ready"
    );

    let router = build_router(AppState::new(app), config.static_dir.as_deref());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Serving notes on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
