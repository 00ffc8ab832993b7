use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::notes::{Note, NoteRepository, Result};
use crate::settings::{Settings, SettingsStore};
use crate::tree::TreeNode;

/// Process status summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub notes_count: usize,
    pub notes_dir: PathBuf,
    pub db_path: PathBuf,
}

/// The note repository together with the settings that locate it.
///
/// Changing `notes_directory` through [`NoteApp::update_settings`] migrates
/// the repository before the new settings are written.
pub struct NoteApp {
    repo: NoteRepository,
    store: SettingsStore,
    settings: Settings,
}

impl NoteApp {
    /// Loads the settings (creating the file if needed) and opens the notes directory.
    pub fn open(store: SettingsStore) -> Result<Self> {
        let settings = store.load()?;
        let repo = NoteRepository::open(&settings.notes_directory)?;

        Ok(Self {
            repo,
            store,
            settings,
        })
    }

    pub fn repository(&self) -> &NoteRepository {
        &self.repo
    }

    pub fn list_notes(&self) -> Vec<Note> {
        self.repo.list_all().to_vec()
    }

    pub fn notes_tree(&self) -> Result<Vec<TreeNode>> {
        self.repo.tree()
    }

    pub fn get_note(&self, id: i64) -> Result<Note> {
        self.repo.get(id).cloned()
    }

    pub fn create_note(&mut self, title: &str, content: &str, parent_id: Option<i64>) -> Result<Note> {
        self.repo.create(title, content, parent_id)
    }

    pub fn update_note(&mut self, id: i64, title: &str, content: &str) -> Result<Note> {
        self.repo.update(id, title, content)
    }

    pub fn move_note(&mut self, id: i64, parent_id: Option<i64>) -> Result<Note> {
        self.repo.move_note(id, parent_id)
    }

    pub fn delete_note(&mut self, id: i64) -> Result<Vec<i64>> {
        self.repo.delete(id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies new settings, migrating the notes first when the directory changes.
    ///
    /// If the migration fails nothing is persisted and the current settings stay.
    pub fn update_settings(&mut self, settings: Settings) -> Result<Settings> {
        let new_dir = std::path::absolute(&settings.notes_directory)?;
        let current_dir = std::path::absolute(self.repo.notes_dir())?;

        if new_dir != current_dir {
            self.repo.relocate(&new_dir)?;
        } else {
            std::fs::create_dir_all(&new_dir)?;
        }

        let settings = Settings {
            notes_directory: new_dir,
        };
        self.store.save(&settings)?;
        self.settings = settings;

        info!(
            notes_directory = %self.settings.notes_directory.display(),
            "settings updated"
        );
        Ok(self.settings.clone())
    }

    pub fn settings_path(&self) -> &Path {
        self.store.path()
    }

    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            notes_count: self.repo.len(),
            notes_dir: self.repo.notes_dir().to_path_buf(),
            db_path: self.repo.db_path().to_path_buf(),
        }
    }
}
