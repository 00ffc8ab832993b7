use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::filesystem::NoteFilesystem;
use crate::index::{IndexRow, NoteIndex};
use crate::migrations::import_legacy_index;
use crate::tree::{self, TreeNode};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Database(rusqlite::Error),
    Json(serde_json::Error),
    IndexCorrupted,
    NotFound(i64),
    ParentNotFound(i64),
    InvalidTitle,
    CycleDetected(i64),
    IdsExhausted,
    NoDefaultPath,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Database(err) => write!(f, "index database error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::IndexCorrupted => write!(f, "note index is missing the notes table"),
            Error::NotFound(id) => write!(f, "note {} not found", id),
            Error::ParentNotFound(id) => write!(f, "parent note {} not found", id),
            Error::InvalidTitle => write!(f, "note title must not be empty"),
            Error::CycleDetected(id) => write!(f, "parent relation loops through note {}", id),
            Error::IdsExhausted => write!(f, "note id space exhausted"),
            Error::NoDefaultPath => write!(
                f,
                "could not determine a default path (home directory not found)"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Database(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub parent_id: Option<i64>,
    /// Local ISO-8601 timestamp, set once at creation.
    pub created: String,
    /// Local ISO-8601 timestamp, bumped on every title/content change.
    pub modified: String,
}

impl Note {
    fn index_row(&self) -> IndexRow {
        IndexRow {
            id: self.id,
            title: self.title.clone(),
            parent_id: self.parent_id,
            created: self.created.clone(),
            modified: self.modified.clone(),
        }
    }
}

/// Authoritative in-memory set of notes backed by a notes directory.
///
/// The directory holds one `<id>.md` body per note plus `note_index.db`.
/// Once loaded, the in-memory set is the source of truth: every mutation
/// rewrites all bodies and the whole index ("save all").
pub struct NoteRepository {
    fs: NoteFilesystem,
    index: NoteIndex,
    notes: Vec<Note>,
}

impl NoteRepository {
    /// Opens the notes directory, creating it and its index when missing.
    ///
    /// An empty index is seeded from a legacy `index.json` if one exists.
    pub fn open<P: AsRef<Path>>(notes_dir: P) -> Result<Self> {
        let (fs, index, notes) = open_dir(notes_dir.as_ref())?;

        info!(
            notes_dir = %fs.root_path().display(),
            db_path = %index.db_path().display(),
            count = notes.len(),
            "note repository opened"
        );

        Ok(Self { fs, index, notes })
    }

    pub fn notes_dir(&self) -> &Path {
        self.fs.root_path()
    }

    pub fn db_path(&self) -> &Path {
        self.index.db_path()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns every note in working-set order.
    pub fn list_all(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the notes as a forest rooted at notes without a parent.
    pub fn tree(&self) -> Result<Vec<TreeNode>> {
        tree::build_forest(&self.notes)
    }

    pub fn get(&self, id: i64) -> Result<&Note> {
        self.notes
            .iter()
            .find(|note| note.id == id)
            .ok_or(Error::NotFound(id))
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(Error::NotFound(id))
    }

    fn contains(&self, id: i64) -> bool {
        self.notes.iter().any(|note| note.id == id)
    }

    /// Creates a note with the next identity (highest existing id + 1).
    pub fn create(&mut self, title: &str, content: &str, parent_id: Option<i64>) -> Result<Note> {
        validate_title(title)?;
        if let Some(parent_id) = parent_id
            && !self.contains(parent_id)
        {
            return Err(Error::ParentNotFound(parent_id));
        }

        let id = self
            .notes
            .iter()
            .map(|note| note.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(Error::IdsExhausted)?;
        let now = now_timestamp();
        let note = Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            parent_id,
            created: now.clone(),
            modified: now,
        };

        self.notes.push(note.clone());
        self.save_all()?;

        debug!(id, ?parent_id, "note created");
        Ok(note)
    }

    /// Replaces title and content and bumps the modified timestamp.
    pub fn update(&mut self, id: i64, title: &str, content: &str) -> Result<Note> {
        let pos = self.position(id)?;
        validate_title(title)?;

        let note = &mut self.notes[pos];
        note.title = title.to_string();
        note.content = content.to_string();
        let now = now_timestamp();
        // Never move backwards if the clock was adjusted
        if now > note.modified {
            note.modified = now;
        }
        let updated = note.clone();

        self.save_all()?;

        debug!(id, "note updated");
        Ok(updated)
    }

    /// Re-parents a note; `None` makes it a root.
    pub fn move_note(&mut self, id: i64, new_parent: Option<i64>) -> Result<Note> {
        let pos = self.position(id)?;
        if let Some(parent_id) = new_parent {
            if !self.contains(parent_id) {
                return Err(Error::ParentNotFound(parent_id));
            }
            if tree::would_create_cycle(&self.notes, id, parent_id) {
                return Err(Error::CycleDetected(id));
            }
        }

        self.notes[pos].parent_id = new_parent;
        let moved = self.notes[pos].clone();

        self.save_all()?;

        debug!(id, ?new_parent, "note moved");
        Ok(moved)
    }

    /// Deletes a note together with all of its descendants.
    ///
    /// Returns the removed ids, children before parents.
    pub fn delete(&mut self, id: i64) -> Result<Vec<i64>> {
        if !self.contains(id) {
            return Err(Error::NotFound(id));
        }

        let doomed = tree::collect_subtree(&self.notes, id)?;
        let doomed_set: HashSet<i64> = doomed.iter().copied().collect();
        self.notes.retain(|note| !doomed_set.contains(&note.id));

        for doomed_id in &doomed {
            self.fs.delete_note(*doomed_id)?;
        }

        self.save_all()?;

        debug!(id, removed = doomed.len(), "note subtree deleted");
        Ok(doomed)
    }

    /// Re-reads the working set from the current directory.
    pub fn reload(&mut self) -> Result<()> {
        self.notes = load_notes(&self.fs, &self.index)?;
        Ok(())
    }

    /// Moves the working set to `new_dir` and reloads it from there.
    ///
    /// Note bodies are copied (the old directory is left untouched) and the
    /// index at the new location is rewritten from the in-memory set. The
    /// repository only switches over once the reload from `new_dir` succeeds.
    pub fn relocate<P: AsRef<Path>>(&mut self, new_dir: P) -> Result<()> {
        let new_dir = new_dir.as_ref();
        if new_dir == self.fs.root_path() {
            return Ok(());
        }

        let new_fs = NoteFilesystem::new(new_dir)?;

        let mut copied = 0;
        for note in &self.notes {
            if self.fs.copy_note_to(note.id, &new_fs)? {
                copied += 1;
            } else {
                new_fs.write_note(note.id, &note.content)?;
            }
        }

        let mut new_index = NoteIndex::open(new_fs.root_path())?;
        let rows: Vec<IndexRow> = self.notes.iter().map(Note::index_row).collect();
        new_index.replace_all(&rows)?;

        let notes = load_notes(&new_fs, &new_index)?;

        info!(
            from = %self.fs.root_path().display(),
            to = %new_fs.root_path().display(),
            notes = notes.len(),
            copied,
            "notes directory migrated"
        );

        self.fs = new_fs;
        self.index = new_index;
        self.notes = notes;
        Ok(())
    }

    /// Rewrites every note body and replaces the whole index.
    fn save_all(&mut self) -> Result<()> {
        let result = self.write_everything();
        if let Err(err) = &result {
            error!(
                notes_dir = %self.fs.root_path().display(),
                error = %err,
                "failed to persist notes; disk may be out of sync until the next save"
            );
        }
        result
    }

    fn write_everything(&mut self) -> Result<()> {
        for note in &self.notes {
            self.fs.write_note(note.id, &note.content)?;
        }

        let rows: Vec<IndexRow> = self.notes.iter().map(Note::index_row).collect();
        self.index.replace_all(&rows)?;

        debug!(count = rows.len(), "notes persisted");
        Ok(())
    }
}

fn open_dir(notes_dir: &Path) -> Result<(NoteFilesystem, NoteIndex, Vec<Note>)> {
    let fs = NoteFilesystem::new(notes_dir)?;
    let mut index = NoteIndex::open(fs.root_path())?;
    import_legacy_index(fs.root_path(), &mut index)?;
    let notes = load_notes(&fs, &index)?;
    Ok((fs, index, notes))
}

/// Joins index rows with their bodies. Missing body files load as empty content.
///
/// A parent reference to a note that is not in the index is cleared, turning
/// the note into a root.
fn load_notes(fs: &NoteFilesystem, index: &NoteIndex) -> Result<Vec<Note>> {
    let rows = index.load_rows()?;
    let ids: HashSet<i64> = rows.iter().map(|row| row.id).collect();

    let mut notes = Vec::with_capacity(rows.len());
    for row in rows {
        let content = fs.read_note_or_empty(row.id)?;
        let parent_id = match row.parent_id {
            Some(parent_id) if !ids.contains(&parent_id) => {
                warn!(id = row.id, parent_id, "dangling parent reference, loading as root");
                None
            }
            other => other,
        };
        notes.push(Note {
            id: row.id,
            title: row.title,
            content,
            parent_id,
            created: row.created,
            modified: row.modified,
        });
    }

    Ok(notes)
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidTitle);
    }
    Ok(())
}

fn now_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
