pub mod app;
pub mod default_paths;
pub mod filesystem;
pub mod index;
pub mod migrations;
pub mod notes;
pub mod settings;
pub mod tree;

// Re-export main types for convenience
pub use app::{Health, NoteApp};
pub use default_paths::{get_default_config_path, get_default_notes_path};
pub use filesystem::NoteFilesystem;
pub use index::{IndexRow, NoteIndex};
pub use migrations::import_legacy_index;
pub use notes::{Error, Note, NoteRepository, Result};
pub use settings::{Settings, SettingsStore};
pub use tree::TreeNode;
