//! # spirit-core
//!
//! Core of Machine Spirit: the `~/.machine_spirit/` directory layout, the
//! flat `config.ini` key/value store, the self-model and the conversation
//! orchestrator.
//!
//! - **`domain`** – Pure path computations ([`DataLayout`], [`Subdir`]), the
//!   `key=value` line format, and [`SelfModel`].
//! - **`infrastructure`** – Home directory lookup, directory creation, the
//!   file-backed [`ConfigStore`] and the JSON [`SelfStateStore`].
//! - **`application`** – [`SpiritContext`], built once at startup and passed
//!   to the rest of the program instead of process-wide globals, and the
//!   [`Orchestrator`] that handles chat messages.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::context::{ContextError, SpiritContext};
pub use application::orchestrator::{
    ChatMessage, ChatResponse, Orchestrator, OrchestratorConfig, Plan, PlanStep, Role,
};
pub use domain::layout::{DataLayout, Subdir, CONFIG_FILE_NAME, ROOT_DIR_NAME};
pub use domain::self_model::{
    Confidence, ConversationMode, EpistemicSnapshot, LightweightSnapshot, Metadata, SelfModel,
    SelfSnapshot, UnknownMode,
};
pub use infrastructure::storage::config::{ConfigError, ConfigStore};
pub use infrastructure::storage::directories::{
    home_dir, initialize_layout, LayoutError, HOME_ENV_VAR,
};
pub use infrastructure::storage::self_state::{SelfStateError, SelfStateStore, SELF_MODEL_FILE_NAME};
