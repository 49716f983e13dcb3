//! Scene — the resolved action name and the script it runs.

use serde::{Deserialize, Serialize};

use crate::part::Part;

/// Opaque script handed to the scene runner. Its shape is owned by whoever
/// executes it.
pub type ScriptPayload = serde_json::Value;

/// Name of a runnable scene: one per part, plus [`SceneId::Away`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
    Away,
}

impl SceneId {
    pub const ALL: [Self; 6] = [
        Self::Morning,
        Self::Noon,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
        Self::Away,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Noon => "Noon",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
            Self::Away => "Away",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scene| scene.as_str() == name)
    }

    /// Scene for the current part and presence.
    #[must_use]
    pub fn resolve(part: Part, is_away: bool) -> Self {
        if is_away { Self::Away } else { part.into() }
    }
}

impl From<Part> for SceneId {
    fn from(part: Part) -> Self {
        match part {
            Part::Morning => Self::Morning,
            Part::Noon => Self::Noon,
            Part::Afternoon => Self::Afternoon,
            Part::Evening => Self::Evening,
            Part::Night => Self::Night,
        }
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub id: SceneId,
    pub script: ScriptPayload,
}
