use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const NOTE_EXTENSION: &str = "md";

/// Markdown body storage: one `<id>.md` file per note in a flat directory.
#[derive(Debug)]
pub struct NoteFilesystem {
    root_path: PathBuf,
}

impl NoteFilesystem {
    pub fn new<P: AsRef<Path>>(root_path: P) -> io::Result<Self> {
        let root_path = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root_path)?;
        Ok(Self { root_path })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn note_path(&self, id: i64) -> PathBuf {
        self.root_path.join(format!("{}.{}", id, NOTE_EXTENSION))
    }

    pub fn note_exists(&self, id: i64) -> bool {
        self.note_path(id).is_file()
    }

    pub fn read_note(&self, id: i64) -> io::Result<String> {
        fs::read_to_string(self.note_path(id))
    }

    /// Reads a note body, treating a missing file as empty content.
    pub fn read_note_or_empty(&self, id: i64) -> io::Result<String> {
        match self.read_note(id) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    pub fn write_note(&self, id: i64, content: &str) -> io::Result<()> {
        fs::write(self.note_path(id), content)
    }

    /// Removes a note body. A file that is already gone is not an error.
    pub fn delete_note(&self, id: i64) -> io::Result<()> {
        match fs::remove_file(self.note_path(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Copies one note body into another store. The source file is left in place.
    ///
    /// Returns `false` when this store has no file for `id`.
    pub fn copy_note_to(&self, id: i64, target: &NoteFilesystem) -> io::Result<bool> {
        let content = match self.read_note(id) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };
        target.write_note(id, &content)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("a/b/notes");
        let fs = NoteFilesystem::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(fs.root_path(), root.as_path());
    }

    #[test]
    fn test_write_and_read_note() {
        let temp_dir = TempDir::new().unwrap();
        let fs = NoteFilesystem::new(temp_dir.path()).unwrap();

        fs.write_note(1, "# Hello\n\nWorld").unwrap();
        assert_eq!(fs.read_note(1).unwrap(), "# Hello\n\nWorld");
        assert!(temp_dir.path().join("1.md").exists());
    }

    #[test]
    fn test_read_missing_note() {
        let temp_dir = TempDir::new().unwrap();
        let fs = NoteFilesystem::new(temp_dir.path()).unwrap();

        assert!(fs.read_note(42).is_err());
        assert_eq!(fs.read_note_or_empty(42).unwrap(), "");
        assert!(!fs.note_exists(42));
    }

    #[test]
    fn test_delete_note_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let fs = NoteFilesystem::new(temp_dir.path()).unwrap();

        fs.write_note(3, "content").unwrap();
        fs.delete_note(3).unwrap();
        assert!(!fs.note_exists(3));

        fs.delete_note(3).unwrap();
    }

    #[test]
    fn test_copy_note_keeps_source() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let source = NoteFilesystem::new(source_dir.path()).unwrap();
        let target = NoteFilesystem::new(target_dir.path()).unwrap();

        source.write_note(7, "moving day").unwrap();

        assert!(source.copy_note_to(7, &target).unwrap());
        assert_eq!(target.read_note(7).unwrap(), "moving day");
        assert_eq!(source.read_note(7).unwrap(), "moving day");

        assert!(!source.copy_note_to(8, &target).unwrap());
        assert!(!target.note_exists(8));
    }

    #[test]
    fn test_unicode_content() {
        let temp_dir = TempDir::new().unwrap();
        let fs = NoteFilesystem::new(temp_dir.path()).unwrap();

        fs.write_note(5, "笔记 · ✓").unwrap();
        assert_eq!(fs.read_note(5).unwrap(), "笔记 · ✓");
    }
}
