use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::index::{IndexRow, NoteIndex};
use crate::notes::Result;

pub const LEGACY_INDEX_FILE_NAME: &str = "index.json";

/// Entry of the flat `index.json` used before the SQLite index existed.
/// It has no parent field; every imported note becomes a root.
#[derive(Debug, Deserialize)]
struct LegacyIndexEntry {
    #[serde(deserialize_with = "deserialize_legacy_id")]
    id: i64,
    title: String,
    #[serde(default)]
    created: String,
    #[serde(default)]
    modified: String,
}

/// Legacy ids were written either as numbers or as numeric strings.
fn deserialize_legacy_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid note id {:?}", text))),
    }
}

/// Imports `<notes_root>/index.json` into an empty index.
///
/// Does nothing when the index already has rows or there is no legacy file.
/// A legacy file that cannot be parsed or inserted is logged and skipped, never fatal.
/// The legacy file itself is left in place. Returns the number of imported notes.
pub fn import_legacy_index(notes_root: &Path, index: &mut NoteIndex) -> Result<usize> {
    if index.count()? > 0 {
        return Ok(0);
    }

    let legacy_path = notes_root.join(LEGACY_INDEX_FILE_NAME);
    let raw = match fs::read_to_string(&legacy_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let entries: Vec<LegacyIndexEntry> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                path = %legacy_path.display(),
                error = %err,
                "skipping unreadable legacy index"
            );
            return Ok(0);
        }
    };

    let rows: Vec<IndexRow> = entries
        .into_iter()
        .map(|entry| IndexRow {
            id: entry.id,
            title: entry.title,
            parent_id: None,
            created: entry.created,
            modified: entry.modified,
        })
        .collect();

    // insert_all is transactional, so a rejected file leaves the index empty
    if let Err(err) = index.insert_all(&rows) {
        warn!(
            path = %legacy_path.display(),
            error = %err,
            "skipping legacy index that could not be imported"
        );
        return Ok(0);
    }
    info!(
        count = rows.len(),
        path = %legacy_path.display(),
        "imported legacy index"
    );

    Ok(rows.len())
}
