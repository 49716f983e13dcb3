//! Raw declarations — configuration as the user wrote it, before resolution.
//!
//! Names stay plain strings here: deciding whether `"Brunch"` is a valid scene
//! or `"Default"` a legal profile name is the resolver's job, and it reports
//! problems as issues instead of refusing to deserialize.

use serde::{Deserialize, Serialize};

use super::Resolution;
use super::resolver::Resolver;

/// A part start as declared: `{ name = "Morning", from = "06:00:00" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDeclaration {
    pub name: String,
    pub from: String,
}

impl PartDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
        }
    }
}

/// Parts of the reserved `Default` profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultProfileDeclaration {
    pub parts: Vec<PartDeclaration>,
}

/// A custom profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDeclaration {
    pub profile: String,
    #[serde(default)]
    pub parts: Vec<PartDeclaration>,
}

/// An override: exactly one of `date` (`YYYY-MM-DD`) or `day` (`Monday`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideDeclaration {
    pub profile: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
}

/// A scene and its opaque script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDeclaration {
    pub scene: String,
    #[serde(default)]
    pub script: serde_json::Value,
}

/// Whole scene configuration as declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationDeclaration {
    pub default_profile: DefaultProfileDeclaration,
    pub profiles: Vec<ProfileDeclaration>,
    pub events: Vec<OverrideDeclaration>,
    pub trackers: Vec<String>,
    pub scenes: Vec<SceneDeclaration>,
}

impl ConfigurationDeclaration {
    /// Resolve this declaration into a runtime configuration plus the issues found.
    #[must_use]
    pub fn resolve(&self) -> Resolution {
        Resolver::new(
            &self.default_profile.parts,
            &self.profiles,
            &self.events,
            &self.trackers,
            &self.scenes,
        )
        .resolve()
    }
}
