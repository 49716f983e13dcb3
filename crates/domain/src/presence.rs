//! Presence — whether the tracked occupants are home.

use serde::{Deserialize, Serialize};

/// Tracker domain accepted in configuration.
pub const TRACKER_DOMAIN: &str = "device_tracker";

/// Aggregate states that mean nobody is home.
pub const AWAY_STATES: [&str; 2] = ["not_home", "off"];

/// Presence derived from the aggregate tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    #[default]
    Home,
    Away,
}

impl Presence {
    /// Classify a raw aggregate state. Anything outside [`AWAY_STATES`] counts as home.
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        if AWAY_STATES.contains(&state) {
            Self::Away
        } else {
            Self::Home
        }
    }

    #[must_use]
    pub fn is_away(self) -> bool {
        matches!(self, Self::Away)
    }
}

/// Whether a tracker entity id (`domain.object_id`) belongs to [`TRACKER_DOMAIN`].
#[must_use]
pub fn is_supported_tracker(entity_id: &str) -> bool {
    entity_id
        .split_once('.')
        .is_some_and(|(domain, _)| domain == TRACKER_DOMAIN)
}
