//! Storage infrastructure: the data directory tree, `config.ini` and the
//! persisted self-model.
//!
//! - `directories` resolves the home directory and creates the layout.
//! - `config` loads and persists the flat key/value store.
//! - `self_state` reads and writes `memory/self_model.json`.

pub mod config;
pub mod directories;
pub mod self_state;
