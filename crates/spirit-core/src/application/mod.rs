//! Application layer: startup wiring and the conversation pipeline.

pub mod context;
pub mod orchestrator;
