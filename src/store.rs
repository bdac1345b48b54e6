//! SQLite-backed dictionary store.
//!
//! A store is a single SQLite file with two tables:
//! - `words(word)`: the vocabulary, one row per distinct word
//! - `entries(word, pos, defs)`: definitions per (word, part of speech), with
//!   `defs` serialized as a JSON array of strings
//!
//! The store is opened either writable, for a build, or read-only and immutable,
//! for lookups and suggestions. Every operation takes the [`Store`] handle
//! explicitly; dropping the handle closes the connection.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Transaction, params};
use serde::{Deserialize, Serialize};

use crate::error::{DictError, Result};

/// Schema applied by default before a build.
pub const DEFAULT_SCHEMA: &str = include_str!("store/schema.sql");

/// Where the schema for a build comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Schema {
    /// The schema bundled with the crate.
    #[default]
    Default,
    /// A schema file read at build time.
    File(PathBuf),
}

impl Schema {
    /// Load the schema SQL.
    pub fn load(&self) -> Result<Cow<'static, str>> {
        match self {
            Schema::Default => Ok(Cow::Borrowed(DEFAULT_SCHEMA)),
            Schema::File(path) => {
                debug!("Loading schema from {}", path.display());
                Ok(Cow::Owned(fs::read_to_string(path)?))
            }
        }
    }
}

/// How a store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// Definitions stored for one part of speech of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosDefinitions {
    pub pos: String,
    pub definitions: Vec<String>,
}

/// Row counts of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub words: u64,
    pub entries: u64,
}

/// What an [`Import::upsert`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new (word, pos) entry was created.
    Inserted,
    /// Definitions were appended to an existing entry.
    Merged,
}

/// An open dictionary store.
pub struct Store {
    conn: Connection,
    path: PathBuf,
    mode: OpenMode,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

fn store_err(context: &str, e: rusqlite::Error) -> DictError {
    DictError::store(format!("{context}: {e}"))
}

/// Escape the characters that would end the path part of an SQLite URI.
fn uri_path(path: &Path) -> String {
    let mut escaped = String::new();
    for ch in path.to_string_lossy().chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            '?' => escaped.push_str("%3f"),
            '#' => escaped.push_str("%23"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

impl Store {
    /// Open an existing store read-only and immutable.
    ///
    /// Fails with [`DictError::Store`] if the file does not exist or is not a
    /// dictionary store.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DictError::store(format!(
                "no dictionary store at {}",
                path.display()
            )));
        }

        let uri = format!("file:{}?mode=ro&immutable=1", uri_path(path));
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&uri, flags)
            .map_err(|e| store_err("failed to open store", e))?;

        let store = Store {
            conn,
            path: path.to_path_buf(),
            mode: OpenMode::ReadOnly,
        };
        store.check_tables()?;
        debug!("Opened store {} read-only", path.display());
        Ok(store)
    }

    /// Create or open a store for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| store_err("failed to create store", e))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA temp_store = MEMORY;")
            .map_err(|e| store_err("failed to configure store", e))?;

        debug!("Opened store {} for writing", path.display());
        Ok(Store {
            conn,
            path: path.to_path_buf(),
            mode: OpenMode::ReadWrite,
        })
    }

    /// Path the store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the store was opened in.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn check_tables(&self) -> Result<()> {
        let found: i64 = self
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master \
                 WHERE type = 'table' AND name IN ('words', 'entries')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| store_err("failed to read store schema", e))?;

        if found != 2 {
            return Err(DictError::store(format!(
                "{} is not a dictionary store",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.mode {
            OpenMode::ReadWrite => Ok(()),
            OpenMode::ReadOnly => Err(DictError::store(format!(
                "{} is opened read-only",
                self.path.display()
            ))),
        }
    }

    /// Execute a schema batch against the store.
    pub fn apply_schema(&self, sql: &str) -> Result<()> {
        self.ensure_writable()?;
        self.conn
            .execute_batch(sql)
            .map_err(|e| store_err("failed to apply schema", e))
    }

    /// Start an import transaction. Nothing written through the returned
    /// [`Import`] is visible until [`Import::commit`]; dropping it rolls back.
    pub fn begin_import(&mut self) -> Result<Import<'_>> {
        self.ensure_writable()?;
        let tx = self
            .conn
            .transaction()
            .map_err(|e| store_err("failed to begin transaction", e))?;
        Ok(Import { tx })
    }

    /// All parts of speech stored for `word`, ordered by part of speech.
    pub fn entries_for(&self, word: &str) -> Result<Vec<PosDefinitions>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT pos, defs FROM entries WHERE word = ?1 ORDER BY pos")
            .map_err(|e| store_err("failed to query entries", e))?;

        let rows = stmt
            .query_map(params![word], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| store_err("failed to query entries", e))?;

        let mut entries = Vec::new();
        for row in rows {
            let (pos, defs) = row.map_err(|e| store_err("failed to read entry", e))?;
            let definitions = decode_defs(&defs).map_err(|e| {
                DictError::store(format!("corrupt definitions for {word:?} ({pos}): {e}"))
            })?;
            entries.push(PosDefinitions { pos, definitions });
        }
        Ok(entries)
    }

    /// Every word in the vocabulary, in lexical order.
    pub fn vocabulary(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT word FROM words ORDER BY word")
            .map_err(|e| store_err("failed to query vocabulary", e))?;

        let words = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| store_err("failed to query vocabulary", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| store_err("failed to read vocabulary", e))?;
        Ok(words)
    }

    /// Count words and entries.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .map_err(|e| store_err("failed to count rows", e))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            words: count("words")?,
            entries: count("entries")?,
        })
    }

    /// Compact the file and refresh query planner statistics.
    pub fn optimize(&self) -> Result<()> {
        self.ensure_writable()?;
        self.conn
            .execute_batch("VACUUM; PRAGMA optimize;")
            .map_err(|e| store_err("failed to optimize store", e))
    }

    /// Close the connection, reporting any error the drop would swallow.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| store_err("failed to close store", e))
    }
}

fn decode_defs(defs: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str(defs)
}

fn encode_defs(defs: &[String]) -> serde_json::Result<String> {
    serde_json::to_string(defs)
}

/// A running import transaction.
pub struct Import<'conn> {
    tx: Transaction<'conn>,
}

impl Import<'_> {
    /// Add definitions for (word, pos), appending to any definitions already
    /// stored for the pair. Also records the word in the vocabulary.
    pub fn upsert(&self, word: &str, pos: &str, definitions: &[String]) -> Result<Upsert> {
        let encoded = encode_defs(definitions)?;
        let inserted = self
            .tx
            .prepare_cached(
                "INSERT INTO entries (word, pos, defs) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (word, pos) DO NOTHING",
            )?
            .execute(params![word, pos, encoded])?;

        let outcome = if inserted == 1 {
            Upsert::Inserted
        } else {
            let current: Option<String> = self
                .tx
                .prepare_cached("SELECT defs FROM entries WHERE word = ?1 AND pos = ?2")?
                .query_row(params![word, pos], |row| row.get(0))
                .optional()?;
            let current = current.ok_or_else(|| {
                DictError::store(format!("entry {word:?} ({pos}) vanished during merge"))
            })?;

            let mut merged = decode_defs(&current)?;
            merged.extend(definitions.iter().cloned());
            self.tx
                .prepare_cached("UPDATE entries SET defs = ?1 WHERE word = ?2 AND pos = ?3")?
                .execute(params![encode_defs(&merged)?, word, pos])?;
            Upsert::Merged
        };

        self.tx
            .prepare_cached("INSERT INTO words (word) VALUES (?1) ON CONFLICT DO NOTHING")?
            .execute(params![word])?;

        Ok(outcome)
    }

    /// Make every upsert of this import visible.
    pub fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| store_err("failed to commit import", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn defs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn writable_store(dir: &TempDir) -> Store {
        let store = Store::create(dir.path().join("dictionary.db")).unwrap();
        store.apply_schema(DEFAULT_SCHEMA).unwrap();
        store
    }

    #[test]
    fn test_upsert_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut store = writable_store(&dir);

        let import = store.begin_import().unwrap();
        assert_eq!(
            import.upsert("run", "verb", &defs(&["to move"])).unwrap(),
            Upsert::Inserted
        );
        assert_eq!(
            import.upsert("run", "noun", &defs(&["a sprint"])).unwrap(),
            Upsert::Inserted
        );
        assert_eq!(
            import.upsert("run", "verb", &defs(&["to operate"])).unwrap(),
            Upsert::Merged
        );
        import.commit().unwrap();

        let entries = store.entries_for("run").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pos, "noun");
        assert_eq!(entries[1].pos, "verb");
        assert_eq!(entries[1].definitions, defs(&["to move", "to operate"]));

        assert_eq!(store.vocabulary().unwrap(), vec!["run".to_string()]);
        assert_eq!(
            store.stats().unwrap(),
            StoreStats {
                words: 1,
                entries: 2
            }
        );
    }

    #[test]
    fn test_dropped_import_rolls_back() {
        let dir = TempDir::new().unwrap();
        let mut store = writable_store(&dir);

        {
            let import = store.begin_import().unwrap();
            import.upsert("apple", "noun", &defs(&["a fruit"])).unwrap();
        }

        assert!(store.entries_for("apple").unwrap().is_empty());
        assert!(store.vocabulary().unwrap().is_empty());
    }

    #[test]
    fn test_open_read_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dictionary.db");
        {
            let mut store = Store::create(&path).unwrap();
            store.apply_schema(DEFAULT_SCHEMA).unwrap();
            let import = store.begin_import().unwrap();
            import.upsert("apple", "noun", &defs(&["a fruit"])).unwrap();
            import.commit().unwrap();
            store.close().unwrap();
        }

        let mut store = Store::open_read_only(&path).unwrap();
        assert_eq!(store.mode(), OpenMode::ReadOnly);
        assert_eq!(store.entries_for("apple").unwrap().len(), 1);
        assert!(matches!(store.begin_import(), Err(DictError::Store(_))));
        assert!(store.optimize().is_err());
    }

    #[test]
    fn test_open_read_only_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Store::open_read_only(dir.path().join("missing.db"));
        assert!(matches!(result, Err(DictError::Store(_))));
    }

    #[test]
    fn test_open_read_only_rejects_foreign_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        {
            let store = Store::create(&path).unwrap();
            store
                .apply_schema("CREATE TABLE notes (body TEXT);")
                .unwrap();
        }

        let result = Store::open_read_only(&path);
        assert!(matches!(result, Err(DictError::Store(_))));
    }

    #[test]
    fn test_open_read_only_rejects_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.db");
        fs::write(&path, vec![b'x'; 4096]).unwrap();

        let result = Store::open_read_only(&path);
        assert!(matches!(result, Err(DictError::Store(_))));
    }

    #[test]
    fn test_corrupt_definitions_are_reported() {
        let dir = TempDir::new().unwrap();
        let store = writable_store(&dir);
        store
            .conn
            .execute(
                "INSERT INTO entries (word, pos, defs) VALUES ('bad', 'noun', 'not json')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.entries_for("bad"),
            Err(DictError::Store(_))
        ));
    }

    #[test]
    fn test_schema_from_missing_file() {
        let schema = Schema::File(PathBuf::from("/nonexistent/schema.sql"));
        assert!(matches!(schema.load(), Err(DictError::Io(_))));
        assert_eq!(Schema::Default.load().unwrap(), DEFAULT_SCHEMA);
    }

    #[test]
    fn test_uri_path_escapes_query_characters() {
        assert_eq!(uri_path(Path::new("/tmp/a?b#c%d")), "/tmp/a%3fb%23c%25d");
    }
}
