//! JSON persistence for the self-model.
//!
//! The model is stored as pretty-printed JSON at
//! `<root>/memory/self_model.json`.  A missing file means a fresh model.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::layout::DataLayout;
use crate::domain::self_model::SelfModel;

/// File name of the persisted self-model inside `memory/`.
pub const SELF_MODEL_FILE_NAME: &str = "self_model.json";

/// Error type for self-model persistence.
#[derive(Debug, Error)]
pub enum SelfStateError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing self-model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored JSON could not be parsed.
    #[error("failed to parse self-model at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The model could not be serialized.
    #[error("failed to serialize self-model: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Reads and writes one self-model file.
#[derive(Debug, Clone)]
pub struct SelfStateStore {
    path: PathBuf,
}

impl SelfStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard location under `layout.memory()`.
    pub fn for_layout(layout: &DataLayout) -> Self {
        Self::new(layout.memory().join(SELF_MODEL_FILE_NAME))
    }

    /// Loads the stored model, or a default one if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`SelfStateError::Io`] for file-system errors other than "not
    /// found", and [`SelfStateError::Parse`] if the JSON is malformed.
    pub fn load(&self) -> Result<SelfModel, SelfStateError> {
        match std::fs::read(&self.path) {
            Ok(content) => {
                let model = serde_json::from_slice(&content).map_err(|source| {
                    SelfStateError::Parse {
                        path: self.path.clone(),
                        source,
                    }
                })?;
                debug!("loaded self-model from {}", self.path.display());
                Ok(model)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no self-model at {}, starting fresh", self.path.display());
                Ok(SelfModel::default())
            }
            Err(source) => Err(SelfStateError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes `model`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SelfStateError::Io`] for file-system failures or
    /// [`SelfStateError::Serialize`] if serialization fails.
    pub fn save(&self, model: &SelfModel) -> Result<(), SelfStateError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SelfStateError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(model).map_err(SelfStateError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| SelfStateError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved self-model to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
