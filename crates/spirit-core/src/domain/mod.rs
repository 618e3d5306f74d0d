//! Domain entities for Machine Spirit.
//!
//! Pure path computations, the `key=value` line format and the self-model.  Nothing in this
//! module touches the file system or reads environment variables; those
//! concerns live in `infrastructure`.

/// The `.machine_spirit` directory layout.
///
/// See [`layout::DataLayout`] for the main type.
pub mod layout;

/// Parsing and rendering of `config.ini` content.
pub mod entries;

/// Identity, runtime state, goals and narrative log.
pub mod self_model;
