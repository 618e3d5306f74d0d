//! Flat `key=value` configuration store backed by `config.ini`.
//!
//! The whole file is read into memory once by [`ConfigStore::load`] and
//! rewritten in full on every [`ConfigStore::set`].  The file format is
//! described in [`crate::domain::entries`].
//!
//! # First run
//!
//! When the file does not exist yet, `load` writes an empty file and starts
//! with no entries.  A file that exists but cannot be read is an error, not
//! a first run: treating a permission problem as "no settings" would hide
//! the user's configuration and overwrite it on the next `set`.
//!
//! # Missing versus empty
//!
//! [`ConfigStore::get`] distinguishes an absent key (`None`) from a key set
//! to the empty string (`Some("")`).  [`ConfigStore::get_or_empty`] folds both
//! into `""` for callers that do not care.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::entries::{parse_entries, render_entries, Entries};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to load config from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file or its directory could not be written.
    #[error("failed to save config to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory view of `config.ini`, mirrored to disk on every mutation.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: Entries,
}

impl ConfigStore {
    /// Opens the store at `path`, creating an empty file on first run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file exists but cannot be read,
    /// and [`ConfigError::Save`] if the first-run file cannot be created.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut store = Self {
            path: path.into(),
            values: Entries::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Replaces the in-memory entries with the file's current content.
    ///
    /// If the file has disappeared the store starts over empty and writes an
    /// empty file.  On a read error the in-memory entries are left as they
    /// were, so a later [`ConfigStore::set`] cannot overwrite the file with a
    /// partial mapping.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::load`].
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no config at {}, creating an empty one", self.path.display());
                self.values.clear();
                return self.save();
            }
            Err(source) => {
                return Err(ConfigError::Load {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let parsed = parse_entries(&content);
        if parsed.skipped > 0 {
            warn!(
                "skipped {} line(s) without '=' in {}",
                parsed.skipped,
                self.path.display()
            );
        }
        if parsed.lossy > 0 {
            warn!(
                "{} line(s) in {} are not valid UTF-8; invalid bytes were replaced",
                parsed.lossy,
                self.path.display()
            );
        }
        debug!(
            "loaded {} config entries from {}",
            parsed.entries.len(),
            self.path.display()
        );
        self.values = parsed.entries;
        Ok(())
    }

    /// Writes every entry to disk, replacing the previous file content.
    ///
    /// The parent directory is created if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Save`] on any file-system failure.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Save {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&self.path, render_entries(&self.values)).map_err(|source| {
            ConfigError::Save {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!("saved {} config entries to {}", self.values.len(), self.path.display());
        Ok(())
    }

    /// Returns the value for `key`, or `None` if it was never set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `""` if it is absent.
    ///
    /// An absent key and a key explicitly set to `""` look the same here; use
    /// [`ConfigStore::get`] when the difference matters.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Inserts or replaces `key` and immediately rewrites the file.
    ///
    /// A trailing `\r` in `value` is read back as part of the line terminator,
    /// so such a value reloads without it.
    ///
    /// If saving fails the new value stays in memory and the error is
    /// returned, so memory and disk differ until the next successful save.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Save`] if the file cannot be written.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), ConfigError> {
        let key = key.into();
        debug!("setting config key {key:?}");
        self.values.insert(key, value.into());
        self.save()
    }

    /// Whether `key` has been set, including to the empty string.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("spirit_config_test_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_load_missing_file_creates_empty_file() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("config.ini");

        // Act
        let store = ConfigStore::load(&path).expect("load");

        // Assert
        assert!(store.is_empty());
        assert!(path.is_file(), "first run must create the file");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_unset_key_is_none_and_empty() {
        let dir = temp_dir();
        let store = ConfigStore::load(dir.join("config.ini")).expect("load");

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.get_or_empty("nonexistent"), "");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_value_is_distinguishable_only_through_get() {
        // Arrange
        let dir = temp_dir();
        let mut store = ConfigStore::load(dir.join("config.ini")).expect("load");

        // Act
        store.set("blank", "").expect("set");

        // Assert
        assert_eq!(store.get("blank"), Some(""));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get_or_empty("blank"), store.get_or_empty("missing"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_writes_file_immediately() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.ini");
        let mut store = ConfigStore::load(&path).expect("load");

        // Act
        store.set("theme", "dark").expect("set");

        // Assert
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "theme=dark\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_overwrite_keeps_single_line() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.ini");
        let mut store = ConfigStore::load(&path).expect("load");

        // Act
        store.set("k", "a").expect("set a");
        store.set("k", "b").expect("set b");

        // Assert
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|l| l.starts_with("k=")).count(), 1);
        assert_eq!(store.get("k"), Some("b"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_existing_file_skips_malformed_lines() {
        // Arrange
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.ini");
        std::fs::write(&path, "theme=dark\ngarbage_line_no_equals\nvolume=7\n").unwrap();

        // Act
        let store = ConfigStore::load(&path).expect("load");

        // Assert
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("theme"), Some("dark"));
        assert_eq!(store.get("volume"), Some("7"));
        assert!(!store.contains("garbage_line_no_equals"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_unreadable_path_is_load_error() {
        // Arrange: a directory where the file should be cannot be read as text
        let dir = temp_dir();
        let path = dir.join("config.ini");
        std::fs::create_dir_all(&path).unwrap();

        // Act
        let result = ConfigStore::load(&path);

        // Assert
        match result {
            Err(ConfigError::Load { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ConfigError::Load, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_with_blocked_parent_is_save_error_and_keeps_value() {
        // Arrange: replace the parent directory with a regular file
        let dir = temp_dir();
        let parent = dir.join("sub");
        let mut store = ConfigStore::load(parent.join("config.ini")).expect("load");
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "file").unwrap();

        // Act
        let result = store.set("theme", "kept");

        // Assert
        assert!(matches!(result, Err(ConfigError::Save { .. })));
        assert_eq!(store.get("theme"), Some("kept"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reload_discards_unsaved_memory_and_rereads_disk() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.ini");
        let mut store = ConfigStore::load(&path).expect("load");
        store.set("a", "1").expect("set");
        std::fs::write(&path, "b=2\n").unwrap();

        // Act
        store.reload().expect("reload");

        // Assert
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some("2"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_reload_keeps_entries_so_next_set_preserves_file() {
        // Arrange: a store with two keys, then the file becomes unreadable
        let dir = temp_dir();
        let path = dir.join("config.ini");
        let mut store = ConfigStore::load(&path).expect("load");
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        // Act
        let result = store.reload();

        // Assert: the error surfaces and memory is untouched
        assert!(matches!(result, Err(ConfigError::Load { .. })));
        assert_eq!(store.len(), 2);

        // Once writable again, the next set keeps every earlier key
        std::fs::remove_dir(&path).unwrap();
        store.set("z", "9").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a=1\nb=2\nz=9\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_file_with_invalid_utf8_keeps_valid_entries() {
        // Arrange
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.ini");
        std::fs::write(&path, b"theme=dark\nname=caf\xe9\n").unwrap();

        // Act
        let store = ConfigStore::load(&path).expect("invalid UTF-8 must not abort load");

        // Assert
        assert_eq!(store.get("theme"), Some("dark"));
        assert_eq!(store.get("name"), Some("caf\u{FFFD}"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reload_after_external_edit_with_invalid_utf8_keeps_other_keys() {
        let dir = temp_dir();
        let path = dir.join("config.ini");
        let mut store = ConfigStore::load(&path).expect("load");
        store.set("a", "1").unwrap();
        std::fs::write(&path, b"a=1\nb=2\nc=caf\xe9\n").unwrap();

        store.reload().expect("reload");
        store.set("z", "9").unwrap();

        let reloaded = ConfigStore::load(&path).unwrap();
        assert_eq!(reloaded.get("a"), Some("1"));
        assert_eq!(reloaded.get("b"), Some("2"));
        assert!(reloaded.contains("c"));
        assert_eq!(reloaded.get("z"), Some("9"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_entries_iterate_in_key_order() {
        let dir = temp_dir();
        let mut store = ConfigStore::load(dir.join("config.ini")).expect("load");
        store.set("zeta", "1").unwrap();
        store.set("alpha", "2").unwrap();

        let keys: Vec<&str> = store.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
