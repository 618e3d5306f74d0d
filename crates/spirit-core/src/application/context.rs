//! Startup context owning the data layout and the config store.
//!
//! Build one [`SpiritContext`] at startup and pass it (or references to its
//! parts) to whatever needs paths or settings.  Tests build isolated contexts
//! with [`SpiritContext::bootstrap_in`] pointing at a temporary home.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::layout::DataLayout;
use crate::infrastructure::storage::config::{ConfigError, ConfigStore};
use crate::infrastructure::storage::directories::{home_dir, initialize_layout, LayoutError};
use crate::infrastructure::storage::self_state::SelfStateStore;

/// Failure while bootstrapping the context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Home directory lookup or directory creation failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// `config.ini` could not be read or created.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Initialized data layout plus loaded configuration.
#[derive(Debug)]
pub struct SpiritContext {
    layout: DataLayout,
    config: ConfigStore,
}

impl SpiritContext {
    /// Resolves the home directory from the environment, creates the data
    /// directories, and loads `config.ini`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Layout`] if the home directory is unresolvable
    /// or a directory cannot be created, and [`ContextError::Config`] if the
    /// config file cannot be read or created.
    pub fn bootstrap() -> Result<Self, ContextError> {
        let home = home_dir()?;
        Self::bootstrap_in(&home)
    }

    /// Same as [`SpiritContext::bootstrap`] with an explicit home directory.
    ///
    /// # Errors
    ///
    /// See [`SpiritContext::bootstrap`].
    pub fn bootstrap_in(home: &Path) -> Result<Self, ContextError> {
        Self::from_layout(DataLayout::under_home(home))
    }

    /// Initializes `layout` on disk and loads its config file.
    ///
    /// # Errors
    ///
    /// See [`SpiritContext::bootstrap`].
    pub fn from_layout(layout: DataLayout) -> Result<Self, ContextError> {
        initialize_layout(&layout)?;
        let config = ConfigStore::load(layout.config_file())?;
        info!(
            "context ready: root={} entries={}",
            layout.root().display(),
            config.len()
        );
        Ok(Self { layout, config })
    }

    /// The initialized directory layout.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// The loaded configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Mutable access for [`ConfigStore::set`].
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Store for the self-model under `memory/`.
    pub fn self_state_store(&self) -> SelfStateStore {
        SelfStateStore::for_layout(&self.layout)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::Subdir;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_home() -> PathBuf {
        std::env::temp_dir().join(format!("spirit_ctx_test_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_bootstrap_in_creates_layout_and_config_file() {
        // Arrange
        let home = temp_home();

        // Act
        let ctx = SpiritContext::bootstrap_in(&home).expect("bootstrap");

        // Assert
        assert_eq!(ctx.layout().root(), home.join(".machine_spirit"));
        assert!(Subdir::ALL.iter().all(|d| ctx.layout().subdir(*d).is_dir()));
        assert!(ctx.layout().config_file().is_file());
        assert!(ctx.config().is_empty());
        assert_eq!(ctx.config().path(), ctx.layout().config_file());

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_config_mut_changes_survive_rebootstrap() {
        // Arrange
        let home = temp_home();
        let mut ctx = SpiritContext::bootstrap_in(&home).expect("bootstrap");

        // Act
        ctx.config_mut().set("volume", "7").expect("set");
        drop(ctx);
        let restarted = SpiritContext::bootstrap_in(&home).expect("rebootstrap");

        // Assert
        assert_eq!(restarted.config().get("volume"), Some("7"));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_self_state_store_lives_in_memory_dir() {
        let home = temp_home();
        let ctx = SpiritContext::bootstrap_in(&home).expect("bootstrap");

        let store = ctx.self_state_store();

        assert_eq!(store.path(), ctx.layout().memory().join("self_model.json"));
        assert!(store.path().parent().is_some_and(Path::is_dir));

        std::fs::remove_dir_all(&home).ok();
    }

    #[test]
    fn test_bootstrap_in_blocked_root_is_layout_error() {
        let home = temp_home();
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join(".machine_spirit"), "file").unwrap();

        let result = SpiritContext::bootstrap_in(&home);

        assert!(matches!(result, Err(ContextError::Layout(LayoutError::CreateDir { .. }))));

        std::fs::remove_dir_all(&home).ok();
    }
}
