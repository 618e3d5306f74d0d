//! Machine Spirit's self-model: identity, capabilities, runtime state,
//! behaviour, goals, sensory state, voice, a narrative event log and the most
//! recent epistemic self-assessment.
//!
//! The model does no I/O.  It derives `Serialize`/`Deserialize` so the
//! infrastructure layer can persist it (see
//! `infrastructure::storage::self_state`) and so callers can export the
//! [`SelfSnapshot`] or the reduced [`LightweightSnapshot`] as JSON.
//!
//! Every struct is `#[serde(default)]`, so a snapshot written by an older
//! build that lacks newer fields still loads.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of most recent narrative events included in a [`SelfSnapshot`].
pub const NARRATIVE_EXPORT_LIMIT: usize = 50;

/// Number of narrative events kept in memory; older events are dropped.
pub const NARRATIVE_RETENTION: usize = 1000;

/// Free-form metadata attached to events and messages.
pub type Metadata = Map<String, Value>;

/// Seconds since the Unix epoch, as a float.
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

// ── Conversation mode ─────────────────────────────────────────────────────────

/// Operational mode for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConversationMode {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "DEV")]
    Dev,
    #[serde(rename = "OPS")]
    Ops,
    #[serde(rename = "STORY")]
    Story,
    #[serde(rename = "ANALYST")]
    Analyst,
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown conversation mode {0:?} (expected default, DEV, OPS, STORY or ANALYST)")]
pub struct UnknownMode(pub String);

impl ConversationMode {
    pub const ALL: [ConversationMode; 5] = [
        ConversationMode::Default,
        ConversationMode::Dev,
        ConversationMode::Ops,
        ConversationMode::Story,
        ConversationMode::Analyst,
    ];

    /// Canonical name, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationMode::Default => "default",
            ConversationMode::Dev => "DEV",
            ConversationMode::Ops => "OPS",
            ConversationMode::Story => "STORY",
            ConversationMode::Analyst => "ANALYST",
        }
    }

    /// Tag prepended to replies in this mode; empty for the default mode.
    pub fn reply_prefix(self) -> &'static str {
        match self {
            ConversationMode::Default => "",
            ConversationMode::Dev => "[DEV] ",
            ConversationMode::Ops => "[OPS] ",
            ConversationMode::Story => "[STORY] ",
            ConversationMode::Analyst => "[ANALYST] ",
        }
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationMode {
    type Err = UnknownMode;

    /// Mode names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

// ── Profiles ──────────────────────────────────────────────────────────────────

/// How sure Machine Spirit is about a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

/// Epistemic self-assessment for a single response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpistemicSnapshot {
    pub confidence: Confidence,
    pub sources: Vec<String>,
    pub notes: String,
}

/// Core identity; rarely changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProfile {
    pub name: String,
    pub version: String,
    pub build_codename: String,
    pub description: String,
}

impl Default for IdentityProfile {
    fn default() -> Self {
        Self {
            name: "Machine Spirit".to_string(),
            version: "0.0.1".to_string(),
            build_codename: "awakening".to_string(),
            description: "Local autonomous AI being with multimodal perception, creativity and \
                          self-improvement."
                .to_string(),
        }
    }
}

/// What Machine Spirit believes it can do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityProfile {
    pub modes: Vec<ConversationMode>,
    pub tools: Vec<String>,
    pub limitations: Vec<String>,
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self {
            modes: ConversationMode::ALL.to_vec(),
            tools: Vec::new(),
            limitations: vec![
                "Reasoning core not fully wired yet.".to_string(),
                "Perception modules are stubs.".to_string(),
            ],
        }
    }
}

/// High-level runtime status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeStatus {
    pub host_os: Option<String>,
    pub cpu_load: Option<f64>,
    pub memory_usage: Option<f64>,
    pub network_ok: Option<bool>,
    pub last_activity_ts: f64,
    pub current_mode: ConversationMode,
    pub active_sessions: usize,
}

impl Default for RuntimeStatus {
    fn default() -> Self {
        Self {
            host_os: None,
            cpu_load: None,
            memory_usage: None,
            network_ok: None,
            last_activity_ts: unix_timestamp(),
            current_mode: ConversationMode::Default,
            active_sessions: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Brief,
    #[default]
    Balanced,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumorLevel {
    None,
    #[default]
    Light,
    Playful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Casual,
    #[default]
    Professional,
    Ceremonial,
}

/// How Machine Spirit tends to communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralProfile {
    pub verbosity: Verbosity,
    pub humor_level: HumorLevel,
    pub formality: Formality,
}

/// Short-term and long-term goals, each list free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalState {
    pub session_goals: Vec<String>,
    pub long_term_goals: Vec<String>,
}

/// Aggregated state reported by perception modules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensoryState {
    pub audio_scene: Option<String>,
    pub last_sounds: Vec<String>,
    pub vision_scene: Option<String>,
    pub detected_objects: Vec<String>,
    pub detected_faces: u32,
}

/// Partial sensory update; only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct SensoryUpdate {
    pub audio_scene: Option<String>,
    pub last_sounds: Option<Vec<String>>,
    pub vision_scene: Option<String>,
    pub detected_objects: Option<Vec<String>>,
    pub detected_faces: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceProfile {
    pub name: String,
    pub style: String,
    pub pitch: String,
    pub pace: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            name: "Machine Spirit Default".to_string(),
            style: "calm_technical".to_string(),
            pitch: "medium_low".to_string(),
            pace: "slightly_fast".to_string(),
        }
    }
}

/// One entry of the internal narrative log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub timestamp: f64,
    pub event_type: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Metadata,
}

// ── Self-model ────────────────────────────────────────────────────────────────

/// Central self-representation of Machine Spirit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfModel {
    pub identity: IdentityProfile,
    pub capabilities: CapabilityProfile,
    pub runtime: RuntimeStatus,
    pub behavior: BehavioralProfile,
    pub goals: GoalState,
    pub sensory: SensoryState,
    pub voice: VoiceProfile,
    pub narrative: Vec<NarrativeEvent>,
    pub last_epistemic: Option<EpistemicSnapshot>,
    message_count: u64,
}

impl SelfModel {
    pub fn new(identity: IdentityProfile, capabilities: CapabilityProfile) -> Self {
        Self {
            identity,
            capabilities,
            ..Self::default()
        }
    }

    /// Records that a message arrived: bumps the activity timestamp and the
    /// message counter.
    ///
    /// `user_id` and `session_id` are accepted for per-user statistics but not
    /// stored yet.
    pub fn track_activity(&mut self, _user_id: &str, _session_id: &str) {
        self.runtime.last_activity_ts = unix_timestamp();
        self.message_count += 1;
        self.runtime.active_sessions = self.runtime.active_sessions.max(1);
    }

    pub fn set_current_mode(&mut self, mode: ConversationMode) {
        self.runtime.current_mode = mode;
    }

    /// Stores `snapshot` as the latest assessment.
    ///
    /// Low confidence while answering briefly raises verbosity to balanced.
    pub fn update_epistemic_state(&mut self, snapshot: EpistemicSnapshot) {
        if snapshot.confidence == Confidence::Low && self.behavior.verbosity == Verbosity::Brief {
            self.behavior.verbosity = Verbosity::Balanced;
        }
        self.last_epistemic = Some(snapshot);
    }

    pub fn update_sensory_state(&mut self, update: SensoryUpdate) {
        if let Some(scene) = update.audio_scene {
            self.sensory.audio_scene = Some(scene);
        }
        if let Some(sounds) = update.last_sounds {
            self.sensory.last_sounds = sounds;
        }
        if let Some(scene) = update.vision_scene {
            self.sensory.vision_scene = Some(scene);
        }
        if let Some(objects) = update.detected_objects {
            self.sensory.detected_objects = objects;
        }
        if let Some(faces) = update.detected_faces {
            self.sensory.detected_faces = faces;
        }
    }

    pub fn add_session_goal(&mut self, goal: impl Into<String>) {
        push_unique(&mut self.goals.session_goals, goal.into());
    }

    pub fn add_long_term_goal(&mut self, goal: impl Into<String>) {
        push_unique(&mut self.goals.long_term_goals, goal.into());
    }

    pub fn clear_session_goals(&mut self) {
        self.goals.session_goals.clear();
    }

    /// Appends a narrative event stamped with the current time.
    pub fn log_event(
        &mut self,
        event_type: impl Into<String>,
        description: impl Into<String>,
        metadata: Metadata,
    ) {
        self.narrative.push(NarrativeEvent {
            timestamp: unix_timestamp(),
            event_type: event_type.into(),
            description: description.into(),
            metadata,
        });
        if self.narrative.len() > NARRATIVE_RETENTION {
            let excess = self.narrative.len() - NARRATIVE_RETENTION;
            self.narrative.drain(..excess);
        }
    }

    /// Messages seen since the model was created.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Full export, with the narrative limited to the newest
    /// [`NARRATIVE_EXPORT_LIMIT`] events.
    pub fn snapshot(&self) -> SelfSnapshot {
        let start = self.narrative.len().saturating_sub(NARRATIVE_EXPORT_LIMIT);
        SelfSnapshot {
            identity: self.identity.clone(),
            capabilities: self.capabilities.clone(),
            runtime: self.runtime.clone(),
            behavior: self.behavior,
            goals: self.goals.clone(),
            sensory: self.sensory.clone(),
            voice: self.voice.clone(),
            last_epistemic: self.last_epistemic.clone(),
            narrative: self.narrative[start..].to_vec(),
            stats: SelfStats {
                message_count: self.message_count,
            },
        }
    }

    /// Reduced export attached to chat replies.
    pub fn lightweight_snapshot(&self) -> LightweightSnapshot {
        LightweightSnapshot {
            identity: IdentitySummary {
                name: self.identity.name.clone(),
                version: self.identity.version.clone(),
                build_codename: self.identity.build_codename.clone(),
            },
            runtime: RuntimeSummary {
                current_mode: self.runtime.current_mode,
                last_activity_ts: self.runtime.last_activity_ts,
            },
            behavior: self.behavior,
            last_epistemic: self.last_epistemic.clone(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

// ── Exports ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfSnapshot {
    pub identity: IdentityProfile,
    pub capabilities: CapabilityProfile,
    pub runtime: RuntimeStatus,
    pub behavior: BehavioralProfile,
    pub goals: GoalState,
    pub sensory: SensoryState,
    pub voice: VoiceProfile,
    pub last_epistemic: Option<EpistemicSnapshot>,
    pub narrative: Vec<NarrativeEvent>,
    pub stats: SelfStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelfStats {
    pub message_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightweightSnapshot {
    pub identity: IdentitySummary,
    pub runtime: RuntimeSummary,
    pub behavior: BehavioralProfile,
    pub last_epistemic: Option<EpistemicSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySummary {
    pub name: String,
    pub version: String,
    pub build_codename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeSummary {
    pub current_mode: ConversationMode,
    pub last_activity_ts: f64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_has_expected_identity_and_modes() {
        let model = SelfModel::default();
        assert_eq!(model.identity.name, "Machine Spirit");
        assert_eq!(model.identity.build_codename, "awakening");
        assert_eq!(model.capabilities.modes.len(), 5);
        assert_eq!(model.runtime.current_mode, ConversationMode::Default);
        assert!(model.last_epistemic.is_none());
    }

    #[test]
    fn test_mode_parses_case_insensitively_and_displays_canonically() {
        assert_eq!("dev".parse::<ConversationMode>(), Ok(ConversationMode::Dev));
        assert_eq!("ANALYST".parse::<ConversationMode>(), Ok(ConversationMode::Analyst));
        assert_eq!(ConversationMode::Story.to_string(), "STORY");
        assert!("chaos".parse::<ConversationMode>().is_err());
    }

    #[test]
    fn test_mode_serializes_with_wire_names() {
        let json = serde_json::to_string(&ConversationMode::ALL).unwrap();
        assert_eq!(json, r#"["default","DEV","OPS","STORY","ANALYST"]"#);
    }

    #[test]
    fn test_track_activity_counts_messages_and_marks_a_session_active() {
        // Arrange
        let mut model = SelfModel::default();
        let before = model.runtime.last_activity_ts;

        // Act
        model.track_activity("u1", "s1");
        model.track_activity("u1", "s1");

        // Assert
        assert_eq!(model.message_count(), 2);
        assert_eq!(model.runtime.active_sessions, 1);
        assert!(model.runtime.last_activity_ts >= before);
    }

    #[test]
    fn test_low_confidence_raises_brief_verbosity() {
        let mut model = SelfModel::default();
        model.behavior.verbosity = Verbosity::Brief;

        model.update_epistemic_state(EpistemicSnapshot {
            confidence: Confidence::Low,
            ..EpistemicSnapshot::default()
        });

        assert_eq!(model.behavior.verbosity, Verbosity::Balanced);
        assert!(model.last_epistemic.is_some());
    }

    #[test]
    fn test_high_confidence_leaves_verbosity_alone() {
        let mut model = SelfModel::default();
        model.behavior.verbosity = Verbosity::Brief;

        model.update_epistemic_state(EpistemicSnapshot {
            confidence: Confidence::High,
            ..EpistemicSnapshot::default()
        });

        assert_eq!(model.behavior.verbosity, Verbosity::Brief);
    }

    #[test]
    fn test_sensory_update_applies_only_provided_fields() {
        // Arrange
        let mut model = SelfModel::default();
        model.sensory.audio_scene = Some("quiet".to_string());

        // Act
        model.update_sensory_state(SensoryUpdate {
            detected_faces: Some(2),
            detected_objects: Some(vec!["mug".to_string()]),
            ..SensoryUpdate::default()
        });

        // Assert
        assert_eq!(model.sensory.audio_scene.as_deref(), Some("quiet"));
        assert_eq!(model.sensory.detected_faces, 2);
        assert_eq!(model.sensory.detected_objects, vec!["mug".to_string()]);
    }

    #[test]
    fn test_goals_are_deduplicated_and_session_goals_clear() {
        let mut model = SelfModel::default();
        model.add_session_goal("fix build");
        model.add_session_goal("fix build");
        model.add_long_term_goal("learn");
        model.add_long_term_goal("learn");

        assert_eq!(model.goals.session_goals.len(), 1);
        assert_eq!(model.goals.long_term_goals.len(), 1);

        model.clear_session_goals();
        assert!(model.goals.session_goals.is_empty());
        assert_eq!(model.goals.long_term_goals.len(), 1);
    }

    #[test]
    fn test_snapshot_limits_narrative_to_newest_events() {
        // Arrange
        let mut model = SelfModel::default();
        for i in 0..(NARRATIVE_EXPORT_LIMIT + 10) {
            model.log_event("tick", format!("event {i}"), Metadata::new());
        }

        // Act
        let snapshot = model.snapshot();

        // Assert
        assert_eq!(snapshot.narrative.len(), NARRATIVE_EXPORT_LIMIT);
        assert_eq!(snapshot.narrative[0].description, "event 10");
        assert_eq!(model.narrative.len(), NARRATIVE_EXPORT_LIMIT + 10);
    }

    #[test]
    fn test_log_event_drops_oldest_beyond_retention() {
        let mut model = SelfModel::default();
        for i in 0..(NARRATIVE_RETENTION + 3) {
            model.log_event("tick", format!("event {i}"), Metadata::new());
        }

        assert_eq!(model.narrative.len(), NARRATIVE_RETENTION);
        assert_eq!(model.narrative[0].description, "event 3");
    }

    #[test]
    fn test_lightweight_snapshot_json_shape() {
        // Arrange
        let mut model = SelfModel::default();
        model.set_current_mode(ConversationMode::Ops);

        // Act
        let json = serde_json::to_value(model.lightweight_snapshot()).unwrap();

        // Assert
        assert_eq!(json["identity"]["name"], "Machine Spirit");
        assert_eq!(json["runtime"]["current_mode"], "OPS");
        assert_eq!(json["behavior"]["verbosity"], "balanced");
        assert_eq!(json["behavior"]["humor_level"], "light");
        assert!(json["last_epistemic"].is_null());
        assert!(json.get("narrative").is_none());
    }

    #[test]
    fn test_full_snapshot_reports_message_count() {
        let mut model = SelfModel::default();
        model.track_activity("u", "s");

        let json = serde_json::to_value(model.snapshot()).unwrap();

        assert_eq!(json["stats"]["message_count"], 1);
        assert_eq!(json["voice"]["style"], "calm_technical");
    }

    #[test]
    fn test_model_deserializes_from_partial_json_with_defaults() {
        let model: SelfModel =
            serde_json::from_str(r#"{"behavior":{"verbosity":"detailed"}}"#).expect("parse");

        assert_eq!(model.behavior.verbosity, Verbosity::Detailed);
        assert_eq!(model.behavior.formality, Formality::Professional);
        assert_eq!(model.identity.name, "Machine Spirit");
    }
}
