//! Data directory layout domain entity.
//!
//! Every file Machine Spirit owns lives below a single root directory,
//! `<home>/.machine_spirit/`.  The root holds the flat `config.ini` file and
//! nine fixed subdirectories, one per data category.  This module only
//! computes paths; creating the directories is the job of
//! `infrastructure::storage::directories`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the root directory created inside the user's home directory.
pub const ROOT_DIR_NAME: &str = ".machine_spirit";

/// Name of the flat configuration file stored directly in the root.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// The fixed subdirectories of the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subdir {
    Config,
    Logs,
    Models,
    Knowledge,
    Memory,
    Backups,
    Themes,
    Hive,
    Tmp,
}

impl Subdir {
    /// All subdirectories, in the order they are created.
    pub const ALL: [Subdir; 9] = [
        Subdir::Config,
        Subdir::Logs,
        Subdir::Models,
        Subdir::Knowledge,
        Subdir::Memory,
        Subdir::Backups,
        Subdir::Themes,
        Subdir::Hive,
        Subdir::Tmp,
    ];

    /// Directory name on disk.
    pub fn name(self) -> &'static str {
        match self {
            Subdir::Config => "config",
            Subdir::Logs => "logs",
            Subdir::Models => "models",
            Subdir::Knowledge => "knowledge",
            Subdir::Memory => "memory",
            Subdir::Backups => "backups",
            Subdir::Themes => "themes",
            Subdir::Hive => "hive",
            Subdir::Tmp => "tmp",
        }
    }
}

impl fmt::Display for Subdir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved directory layout rooted at a single data directory.
///
/// A `DataLayout` always carries a root, so accessors can never produce
/// paths relative to the working directory.  All accessors are pure: they do
/// not touch the file system and do not check that the directory exists.
///
/// # Example
///
/// ```rust
/// use spirit_core::DataLayout;
///
/// let layout = DataLayout::under_home("/home/ada");
/// assert_eq!(layout.root(), std::path::Path::new("/home/ada/.machine_spirit"));
/// assert!(layout.logs().ends_with(".machine_spirit/logs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted exactly at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the standard layout for a user whose home directory is `home`.
    pub fn under_home(home: impl AsRef<Path>) -> Self {
        Self::new(home.as_ref().join(ROOT_DIR_NAME))
    }

    /// Root data directory, `<home>/.machine_spirit`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the given subdirectory.
    pub fn subdir(&self, dir: Subdir) -> PathBuf {
        self.root.join(dir.name())
    }

    /// Path of the flat `config.ini` file.
    ///
    /// Note that the file lives in the root itself, not in [`Self::config`].
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// `config/`: auxiliary configuration files.
    pub fn config(&self) -> PathBuf {
        self.subdir(Subdir::Config)
    }

    /// `logs/`: log files.
    pub fn logs(&self) -> PathBuf {
        self.subdir(Subdir::Logs)
    }

    /// `models/`: model weights.
    pub fn models(&self) -> PathBuf {
        self.subdir(Subdir::Models)
    }

    /// `knowledge/`: knowledge base content.
    pub fn knowledge(&self) -> PathBuf {
        self.subdir(Subdir::Knowledge)
    }

    /// `memory/`: persisted long-term state, including the self-model snapshot.
    pub fn memory(&self) -> PathBuf {
        self.subdir(Subdir::Memory)
    }

    /// `backups/`: backup copies.
    pub fn backups(&self) -> PathBuf {
        self.subdir(Subdir::Backups)
    }

    /// `themes/`: UI themes.
    pub fn themes(&self) -> PathBuf {
        self.subdir(Subdir::Themes)
    }

    /// `hive/`: data shared with other instances.
    pub fn hive(&self) -> PathBuf {
        self.subdir(Subdir::Hive)
    }

    /// `tmp/`: scratch files.
    pub fn tmp(&self) -> PathBuf {
        self.subdir(Subdir::Tmp)
    }

    /// Every subdirectory path paired with its [`Subdir`], in creation order.
    pub fn subdirs(&self) -> impl Iterator<Item = (Subdir, PathBuf)> + '_ {
        Subdir::ALL.into_iter().map(move |d| (d, self.subdir(d)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
