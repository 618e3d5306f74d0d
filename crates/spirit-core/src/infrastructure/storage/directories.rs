//! Home directory resolution and creation of the data directory tree.
//!
//! The home directory comes from a single environment variable:
//! - Windows: `%USERPROFILE%`
//! - Linux / macOS / other: `$HOME`
//!
//! An unset or empty variable is reported as
//! [`LayoutError::HomeUnresolvable`]; there is no fallback guess.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::layout::DataLayout;

/// Environment variable holding the user's home directory on this platform.
#[cfg(target_os = "windows")]
pub const HOME_ENV_VAR: &str = "USERPROFILE";

/// Environment variable holding the user's home directory on this platform.
#[cfg(not(target_os = "windows"))]
pub const HOME_ENV_VAR: &str = "HOME";

/// Error type for resolving and creating the directory layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The home directory environment variable is unset or empty.
    #[error("home directory could not be resolved: {var} is not set")]
    HomeUnresolvable { var: &'static str },

    /// A directory in the layout could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads the platform home directory from the environment.
///
/// # Errors
///
/// Returns [`LayoutError::HomeUnresolvable`] when the variable is unset or
/// empty.
pub fn home_dir() -> Result<PathBuf, LayoutError> {
    home_dir_from(std::env::var_os(HOME_ENV_VAR))
}

/// Validates a raw home directory value as read from the environment.
pub fn home_dir_from(value: Option<OsString>) -> Result<PathBuf, LayoutError> {
    match value {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => Err(LayoutError::HomeUnresolvable { var: HOME_ENV_VAR }),
    }
}

impl DataLayout {
    /// Builds the standard layout for the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::HomeUnresolvable`] if the home directory
    /// variable is unset or empty.
    pub fn from_env() -> Result<Self, LayoutError> {
        Ok(Self::under_home(home_dir()?))
    }
}

/// Creates the root and every subdirectory of `layout`.
///
/// Missing intermediate directories are created as well.  Existing
/// directories are left untouched, so calling this repeatedly is safe.
///
/// # Errors
///
/// Returns [`LayoutError::CreateDir`] for the first directory that cannot be
/// created.
pub fn initialize_layout(layout: &DataLayout) -> Result<(), LayoutError> {
    create_dir(layout.root().to_path_buf())?;
    for (dir, path) in layout.subdirs() {
        debug!("ensuring {dir} directory at {}", path.display());
        create_dir(path)?;
    }
    info!("data directory ready at {}", layout.root().display());
    Ok(())
}

fn create_dir(path: PathBuf) -> Result<(), LayoutError> {
    std::fs::create_dir_all(&path).map_err(|source| LayoutError::CreateDir { path, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
