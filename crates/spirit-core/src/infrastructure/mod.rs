//! Infrastructure layer: file-system and environment adapters.
//!
//! **Dependency rule**: this layer may depend on `domain`, but MUST NOT be
//! imported by it.

pub mod storage;
