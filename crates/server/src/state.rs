use std::sync::{Arc, Mutex};

use notetree_core::NoteApp;

use crate::error::ApiError;

/// Shared handle to the single note app, injected into every route.
///
/// The mutex serializes all access so "save all" persistence never interleaves.
#[derive(Clone)]
pub struct AppState {
    app: Arc<Mutex<NoteApp>>,
}

impl AppState {
    pub fn new(app: NoteApp) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
        }
    }

    /// Runs `f` against the locked app on the blocking thread pool.
    ///
    /// Every repository call touches SQLite and the notes directory, and a
    /// relocation copies the whole store, so none of it runs on a runtime worker.
    pub async fn run<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut NoteApp) -> notetree_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let app = Arc::clone(&self.app);
        tokio::task::spawn_blocking(move || {
            let mut app = app
                .lock()
                .map_err(|_| ApiError::Internal("note store lock poisoned".to_string()))?;
            f(&mut app).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("note store task failed: {}", err)))?
    }
}
