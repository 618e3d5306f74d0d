//! Conversation orchestrator.
//!
//! Routes each user message through a fixed pipeline:
//!
//! ```text
//! handle_message()
//!  ├─ SelfModel::track_activity / set_current_mode
//!  ├─ append user message to the session history
//!  ├─ draft_plan()          -- logs "plan_drafted" to the narrative
//!  ├─ generate_reply()      -- mode-prefixed echo, low-confidence snapshot
//!  ├─ append assistant reply
//!  └─ SelfModel::update_epistemic_state
//! ```
//!
//! Session histories live in memory only and are truncated to the newest
//! `max_history_messages` entries.  The reasoning step is a placeholder; the
//! pipeline shape is what later reasoning and tool modules plug into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::self_model::{
    Confidence, ConversationMode, EpistemicSnapshot, LightweightSnapshot, Metadata, SelfModel,
};
use crate::infrastructure::storage::config::ConfigStore;

/// `config.ini` key for [`OrchestratorConfig::default_mode`].
pub const DEFAULT_MODE_KEY: &str = "orchestrator.default_mode";
/// `config.ini` key for [`OrchestratorConfig::max_history_messages`].
pub const MAX_HISTORY_KEY: &str = "orchestrator.max_history_messages";
/// `config.ini` key for [`OrchestratorConfig::enable_autonomy`].
pub const ENABLE_AUTONOMY_KEY: &str = "orchestrator.enable_autonomy";

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Mode used when a message does not request one.
    pub default_mode: ConversationMode,
    /// Per-session history cap; older messages are dropped first.
    pub max_history_messages: usize,
    /// Reserved for autonomous behaviour; not acted on yet.
    pub enable_autonomy: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_mode: ConversationMode::Default,
            max_history_messages: 50,
            enable_autonomy: true,
        }
    }
}

impl OrchestratorConfig {
    /// Reads the `orchestrator.*` keys from `store`.
    ///
    /// Missing keys use the defaults; unparsable values are logged and also
    /// fall back to the defaults.
    pub fn from_store(store: &ConfigStore) -> Self {
        let defaults = Self::default();
        Self {
            default_mode: parse_or(store, DEFAULT_MODE_KEY, defaults.default_mode),
            max_history_messages: parse_or(store, MAX_HISTORY_KEY, defaults.max_history_messages),
            enable_autonomy: parse_or(store, ENABLE_AUTONOMY_KEY, defaults.enable_autonomy),
        }
    }
}

fn parse_or<T>(store: &ConfigStore, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match store.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("ignoring invalid {key}={raw:?}: {e}");
            default
        }),
    }
}

/// Who wrote a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub metadata: Metadata,
}

/// One step of a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// What the orchestrator intends to do with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub mode: ConversationMode,
    pub steps: Vec<PlanStep>,
    pub session_id: String,
}

/// Result of [`Orchestrator::handle_message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub mode: ConversationMode,
    pub epistemic: EpistemicSnapshot,
    pub self_state: LightweightSnapshot,
}

/// Coordinates conversations and keeps the self-model up to date.
#[derive(Debug)]
pub struct Orchestrator {
    self_model: SelfModel,
    config: OrchestratorConfig,
    conversations: HashMap<String, Vec<ChatMessage>>,
}

impl Orchestrator {
    pub fn new(self_model: SelfModel, config: OrchestratorConfig) -> Self {
        Self {
            self_model,
            config,
            conversations: HashMap::new(),
        }
    }

    /// Handles one user message and returns the reply.
    ///
    /// `mode` overrides [`OrchestratorConfig::default_mode`] for this message.
    pub fn handle_message(
        &mut self,
        session_id: &str,
        user_id: &str,
        text: &str,
        mode: Option<ConversationMode>,
        metadata: Option<Metadata>,
    ) -> ChatResponse {
        let mode = mode.unwrap_or(self.config.default_mode);
        debug!("handling message for session {session_id} in {mode} mode");

        self.self_model.track_activity(user_id, session_id);
        self.self_model.set_current_mode(mode);

        self.append_message(session_id, Role::User, text, metadata.unwrap_or_default());

        let plan = self.draft_plan(mode, session_id);
        let (reply, epistemic) = generate_reply(text, &plan);

        let mut reply_meta = Metadata::new();
        reply_meta.insert("mode".to_string(), Value::from(mode.as_str()));
        self.append_message(session_id, Role::Assistant, &reply, reply_meta);

        self.self_model.update_epistemic_state(epistemic.clone());

        ChatResponse {
            reply,
            mode,
            epistemic,
            self_state: self.self_model.lightweight_snapshot(),
        }
    }

    /// Copy of the current history for `session_id`; empty if unknown.
    pub fn conversation_history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.conversations.get(session_id).cloned().unwrap_or_default()
    }

    pub fn clear_conversation_history(&mut self, session_id: &str) {
        self.conversations.remove(session_id);
        self.self_model.runtime.active_sessions = self.conversations.len();
    }

    pub fn self_model(&self) -> &SelfModel {
        &self.self_model
    }

    pub fn self_model_mut(&mut self) -> &mut SelfModel {
        &mut self.self_model
    }

    /// Hands the self-model back, e.g. for persisting it.
    pub fn into_self_model(self) -> SelfModel {
        self.self_model
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn append_message(&mut self, session_id: &str, role: Role, content: &str, metadata: Metadata) {
        let history = self.conversations.entry(session_id.to_string()).or_default();
        history.push(ChatMessage {
            role,
            content: content.to_string(),
            metadata,
        });
        let max = self.config.max_history_messages;
        if history.len() > max {
            let excess = history.len() - max;
            history.drain(..excess);
        }
        self.self_model.runtime.active_sessions = self.conversations.len();
    }

    fn draft_plan(&mut self, mode: ConversationMode, session_id: &str) -> Plan {
        let plan = Plan {
            mode,
            steps: vec![PlanStep {
                kind: "respond_directly".to_string(),
                description: "Use the core text model to answer the user.".to_string(),
            }],
            session_id: session_id.to_string(),
        };

        let mut meta = Metadata::new();
        meta.insert("session_id".to_string(), Value::from(session_id));
        self.self_model
            .log_event("plan_drafted", format!("Drafted simple plan with mode={mode}"), meta);
        plan
    }
}

fn generate_reply(text: &str, plan: &Plan) -> (String, EpistemicSnapshot) {
    let reply = format!(
        "{}Machine Spirit has received: {text:?}. Real reasoning core not wired yet.",
        plan.mode.reply_prefix()
    );
    let epistemic = EpistemicSnapshot {
        confidence: Confidence::Low,
        sources: vec!["internal_stub".to_string()],
        notes: "Using placeholder echo logic; no real model consulted yet.".to_string(),
    };
    (reply, epistemic)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
