//! Batch import of a raw word list into a dictionary store.
//!
//! [`StoreBuilder::build`] writes a stream of [`RawRecord`]s into an open store in
//! one transaction. [`StoreBuilder::build_file`] is the whole-file rebuild: it
//! decodes a source file into a fresh temporary store and moves it over the target
//! only once the import has committed.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use tempfile::Builder;

use crate::error::{DictError, Result};
use crate::source::{RawRecord, RecordReader};
use crate::store::{Schema, Store, Upsert};

/// Default number of records between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5_000;

/// Configuration for a build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Schema applied before the import transaction starts.
    pub schema: Schema,
    /// Log a progress line every this many records (0 disables progress lines).
    pub progress_interval: usize,
    /// Compact the store after commit.
    pub optimize: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            schema: Schema::Default,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            optimize: true,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records written.
    pub records: usize,
    /// Records that created a new (word, pos) entry.
    pub inserted: usize,
    /// Records whose definitions were appended to an existing entry.
    pub merged: usize,
}

/// Builds dictionary stores from raw records.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    config: BuildConfig,
}

impl StoreBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        StoreBuilder::default()
    }

    /// Create a builder with a custom configuration.
    pub fn with_config(config: BuildConfig) -> Self {
        StoreBuilder { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Import `records` into `store` and return the number of records written.
    ///
    /// Nothing becomes visible unless every record was decoded and written. A
    /// decode failure aborts with [`DictError::MalformedSource`], a write failure
    /// with [`DictError::Build`]; in both cases the transaction is rolled back.
    pub fn build<I>(&self, records: I, store: &mut Store) -> Result<usize>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        self.build_with_report(records, store).map(|report| report.records)
    }

    /// Same as [`StoreBuilder::build`], returning insert and merge counts too.
    pub fn build_with_report<I>(&self, records: I, store: &mut Store) -> Result<BuildReport>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        let schema = self.config.schema.load()?;
        store.apply_schema(&schema)?;

        let start = Instant::now();
        let mut report = BuildReport::default();
        let import = store.begin_import()?;

        for (index, record) in records.into_iter().enumerate() {
            let record = match record {
                Ok(record) => record.normalized(),
                Err(e @ DictError::MalformedSource { .. }) => return Err(e),
                Err(e) => return Err(DictError::malformed(index, e.to_string())),
            };

            match import.upsert(&record.word, &record.pos, &record.definitions) {
                Ok(Upsert::Inserted) => report.inserted += 1,
                Ok(Upsert::Merged) => report.merged += 1,
                Err(e) => return Err(DictError::build(index, record.word, e)),
            }
            report.records += 1;

            if self.config.progress_interval > 0
                && report.records % self.config.progress_interval == 0
            {
                info!("inserted {} entries", report.records);
            }
        }

        import
            .commit()
            .map_err(|e| DictError::build(report.records, "", e))?;

        if self.config.optimize
            && let Err(e) = store.optimize()
        {
            warn!("Store optimization skipped: {e}");
        }

        info!(
            "done, total entries: {} ({} merged) in {:.2?}",
            report.records,
            report.merged,
            start.elapsed()
        );
        Ok(report)
    }

    /// Rebuild the store at `target` from the JSON source at `source`.
    ///
    /// The import runs against a temporary file next to `target`, which replaces
    /// `target` only after a successful commit. On failure `target` is left as it
    /// was, or absent if it did not exist.
    pub fn build_file<S, T>(&self, source: S, target: T) -> Result<BuildReport>
    where
        S: AsRef<Path>,
        T: AsRef<Path>,
    {
        let source = source.as_ref();
        let target = target.as_ref();
        info!(
            "Generating DB\n  in: {}\n  out: {}",
            source.display(),
            target.display()
        );

        // The schema is checked before the source is touched.
        self.config.schema.load()?;
        let records = RecordReader::open(source)?;

        if target.is_dir() {
            warn!("Removing directory at store path {}", target.display());
            fs::remove_dir_all(target)?;
        }
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        fs::create_dir_all(&dir)?;

        let staging = Builder::new()
            .prefix(".adict-build-")
            .suffix(".db")
            .tempfile_in(&dir)?;
        debug!("Staging build in {}", staging.path().display());

        let mut store = Store::create(staging.path())?;
        let report = self.build_with_report(records, &mut store)?;
        store.close()?;

        // Temporary files are owner-only; the store keeps the target's mode.
        if let Some(permissions) = store_permissions(target)? {
            fs::set_permissions(staging.path(), permissions)?;
        }
        staging
            .persist(target)
            .map_err(|e| DictError::build(report.records, "", e.error))?;
        info!("Generation complete: {}", target.display());
        Ok(report)
    }
}

/// Permissions for a rebuilt store: those of the store being replaced, or
/// `0644` for a new one on Unix.
fn store_permissions(target: &Path) -> Result<Option<fs::Permissions>> {
    match fs::metadata(target) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_store_permissions()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn new_store_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_store_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ok(word: &str, pos: &str, defs: &[&str]) -> Result<RawRecord> {
        Ok(RawRecord::new(word, pos, defs.iter().copied()))
    }

    fn quiet_builder() -> StoreBuilder {
        StoreBuilder::with_config(BuildConfig {
            optimize: false,
            ..BuildConfig::default()
        })
    }

    #[test]
    fn test_build_counts_records() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();

        let records = vec![
            ok("Apple", "noun", &["a fruit"]),
            ok("apple ", "noun", &["a company"]),
            ok("run", "verb", &["to move"]),
        ];
        let report = quiet_builder()
            .build_with_report(records, &mut store)
            .unwrap();

        assert_eq!(
            report,
            BuildReport {
                records: 3,
                inserted: 2,
                merged: 1
            }
        );
        let apple = store.entries_for("apple").unwrap();
        assert_eq!(apple.len(), 1);
        assert_eq!(apple[0].definitions, vec!["a fruit", "a company"]);
    }

    #[test]
    fn test_pos_is_trimmed_not_lowercased() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();

        quiet_builder()
            .build(vec![ok("Set", " Noun ", &["a group"])], &mut store)
            .unwrap();

        let entries = store.entries_for("set").unwrap();
        assert_eq!(entries[0].pos, "Noun");
    }

    #[test]
    fn test_decode_error_rolls_back() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();

        let records = vec![
            ok("apple", "noun", &["a fruit"]),
            Err(DictError::malformed(1, "truncated")),
        ];
        let result = quiet_builder().build(records, &mut store);

        assert!(matches!(
            result,
            Err(DictError::MalformedSource { index: 1, .. })
        ));
        assert!(store.vocabulary().unwrap().is_empty());
        assert!(store.entries_for("apple").unwrap().is_empty());
    }

    #[test]
    fn test_write_error_reports_record() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();

        // Entries without the unique key cannot satisfy the upsert's conflict target.
        let builder = StoreBuilder::with_config(BuildConfig {
            schema: Schema::File(write_schema(
                &dir,
                "CREATE TABLE words (word TEXT PRIMARY KEY);\
                 CREATE TABLE entries (word TEXT, pos TEXT, defs TEXT);",
            )),
            optimize: false,
            ..BuildConfig::default()
        });

        let result = builder.build(vec![ok("apple", "noun", &["a fruit"])], &mut store);
        match result {
            Err(DictError::Build { index, word, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(word, "apple");
            }
            other => panic!("Expected Build error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_schema_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();
        let builder = StoreBuilder::with_config(BuildConfig {
            schema: Schema::File(dir.path().join("missing.sql")),
            ..BuildConfig::default()
        });

        let result = builder.build(vec![ok("apple", "noun", &["a fruit"])], &mut store);
        assert!(matches!(result, Err(DictError::Io(_))));
        // No tables were created.
        assert!(store.stats().is_err());
    }

    #[test]
    fn test_build_file_replaces_target() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dictionary.json");
        let target = dir.path().join("nested").join("dictionary.db");
        fs::write(
            &source,
            r#"[{"word": "Cat", "pos": "noun", "definitions": ["a small feline"]}]"#,
        )
        .unwrap();

        let report = quiet_builder().build_file(&source, &target).unwrap();
        assert_eq!(report.records, 1);

        let store = Store::open_read_only(&target).unwrap();
        assert_eq!(store.vocabulary().unwrap(), vec!["cat".to_string()]);
    }

    #[test]
    fn test_build_file_removes_directory_at_target() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dictionary.json");
        let target = dir.path().join("dictionary.db");
        fs::create_dir_all(target.join("leftover")).unwrap();
        fs::write(&source, "[]").unwrap();

        quiet_builder().build_file(&source, &target).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn test_build_file_keeps_previous_store_on_failure() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        let target = dir.path().join("dictionary.db");
        fs::write(&good, r#"[{"word": "dog", "pos": "noun", "definitions": ["a pet"]}]"#)
            .unwrap();
        fs::write(&bad, r#"[{"word": "cat", "pos": "noun", "definitions": ["#).unwrap();

        quiet_builder().build_file(&good, &target).unwrap();
        let result = quiet_builder().build_file(&bad, &target);
        assert!(matches!(result, Err(DictError::MalformedSource { .. })));

        let store = Store::open_read_only(&target).unwrap();
        assert_eq!(store.vocabulary().unwrap(), vec!["dog".to_string()]);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".adict-build-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_error_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::create(dir.path().join("d.db")).unwrap();
        quiet_builder()
            .build(vec![ok("keep", "verb", &["to hold"])], &mut store)
            .unwrap();

        let builder = StoreBuilder::with_config(BuildConfig {
            schema: Schema::File(write_schema(
                &dir,
                &format!(
                    "{}\nCREATE TRIGGER IF NOT EXISTS reject_bad BEFORE INSERT ON entries \
                     WHEN NEW.word = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
                    crate::store::DEFAULT_SCHEMA
                ),
            )),
            optimize: false,
            ..BuildConfig::default()
        });

        let records = vec![
            ok("apple", "noun", &["a fruit"]),
            ok("keep", "verb", &["to retain"]),
            ok("bad", "adjective", &["not good"]),
        ];
        match builder.build(records, &mut store) {
            Err(DictError::Build { index, word, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(word, "bad");
            }
            other => panic!("Expected Build error, got {other:?}"),
        }

        assert_eq!(store.vocabulary().unwrap(), vec!["keep".to_string()]);
        let keep = store.entries_for("keep").unwrap();
        assert_eq!(keep[0].definitions, vec!["to hold"]);
        assert!(store.entries_for("apple").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_file_store_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dictionary.json");
        let target = dir.path().join("dictionary.db");
        fs::write(&source, r#"[{"word": "cat", "pos": "noun", "definitions": ["a pet"]}]"#)
            .unwrap();

        quiet_builder().build_file(&source, &target).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_rebuild_keeps_target_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dictionary.json");
        let target = dir.path().join("dictionary.db");
        fs::write(&source, r#"[{"word": "cat", "pos": "noun", "definitions": ["a pet"]}]"#)
            .unwrap();

        quiet_builder().build_file(&source, &target).unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        quiet_builder().build_file(&source, &target).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    fn write_schema(dir: &TempDir, sql: &str) -> std::path::PathBuf {
        let path = dir.path().join("schema.sql");
        fs::write(&path, sql).unwrap();
        path
    }
}
