//! Event — an immutable record of something that happened.
//!
//! State changes of tracker entities travel on the bus as events, and the
//! scene manager announces every scene change the same way.

use serde::{Deserialize, Serialize};

use crate::scene::SceneId;
use crate::time::{self, LocalTimestamp};

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An entity's state changed (`data` holds `from` and `to`).
    StateChanged,
    /// The resolved scene changed (`data` holds `from` and `to`).
    SceneChanged,
}

/// A bus event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    /// Entity the event is about, e.g. `group.homescene_trackers`.
    pub entity_id: Option<String>,
    pub data: serde_json::Value,
    pub time_fired: LocalTimestamp,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<String>, data: serde_json::Value) -> Self {
        Self {
            event_type,
            entity_id,
            data,
            time_fired: time::now(),
        }
    }

    /// State change of `entity_id`.
    #[must_use]
    pub fn state_changed(entity_id: impl Into<String>, from: Option<&str>, to: &str) -> Self {
        Self::new(
            EventType::StateChanged,
            Some(entity_id.into()),
            serde_json::json!({ "from": from, "to": to }),
        )
    }

    /// Scene change announced by the scene manager.
    #[must_use]
    pub fn scene_changed(from: SceneId, to: SceneId) -> Self {
        Self::new(
            EventType::SceneChanged,
            None,
            serde_json::json!({ "from": from, "to": to }),
        )
    }

    /// Whether this is a state change of `entity_id`.
    #[must_use]
    pub fn is_state_change_of(&self, entity_id: &str) -> bool {
        self.event_type == EventType::StateChanged && self.entity_id.as_deref() == Some(entity_id)
    }
}
