use std::path::{Path, PathBuf};

use rusqlite::{Connection, Result as SqlResult, params};

use crate::notes::{Error, Result};

pub const INDEX_FILE_NAME: &str = "note_index.db";

const SCHEMA_VERSION: i32 = 1;

/// One row of the notes index: everything about a note except its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub created: String,
    pub modified: String,
}

/// SQLite metadata table co-located with the note bodies.
pub struct NoteIndex {
    db: Connection,
    db_path: PathBuf,
}

impl NoteIndex {
    /// Opens (or creates) `<dir>/note_index.db`, runs migrations and verifies the schema.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let db_path = dir.as_ref().join(INDEX_FILE_NAME);
        let db = Connection::open(&db_path)?;

        run_migrations(&db)?;
        verify_schema(&db)?;

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .db
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Returns every row, roots first, then grouped by parent and ordered by id.
    pub fn load_rows(&self) -> Result<Vec<IndexRow>> {
        let mut stmt = self.db.prepare(
            "SELECT id, title, parent_id, created, modified FROM notes ORDER BY parent_id, id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(IndexRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    parent_id: row.get(2)?,
                    created: row.get(3)?,
                    modified: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Clears the table and reinserts `rows`, all inside one transaction.
    pub fn replace_all(&mut self, rows: &[IndexRow]) -> Result<()> {
        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM notes", [])?;
        insert_rows(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    /// Inserts `rows` without touching existing ones, inside one transaction.
    pub fn insert_all(&mut self, rows: &[IndexRow]) -> Result<()> {
        let tx = self.db.transaction()?;
        insert_rows(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_rows(conn: &Connection, rows: &[IndexRow]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO notes (id, title, parent_id, created, modified) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.title,
            row.parent_id,
            row.created,
            row.modified
        ])?;
    }
    Ok(())
}

fn get_schema_version(conn: &Connection) -> SqlResult<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

fn run_migrations(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version < 1 {
        // IF NOT EXISTS: indexes written before versioning already carry this table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                parent_id INTEGER,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES notes(id)
            );

            CREATE INDEX IF NOT EXISTS idx_notes_parent_id ON notes(parent_id);",
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}

fn verify_schema(conn: &Connection) -> Result<()> {
    let notes_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='notes'",
        [],
        |row| Ok(row.get::<_, i32>(0)? > 0),
    )?;

    if !notes_exists {
        return Err(Error::IndexCorrupted);
    }

    Ok(())
}
