//! Profile — a named bundle of part start times and owned overrides.
//!
//! Two profiles are reserved by the system: [`SystemProfile::Default`] is
//! active on every day without an override, [`SystemProfile::Away`] is only
//! selected through presence and never takes part in the day-part lookup.
//! Every other profile comes from configuration and is a [`CustomProfile`].

use std::fmt;

use serde::{Serialize, Serializer};

use crate::overrides::OverrideKey;
use crate::part::Part;

/// Reserved profile names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemProfile {
    Default,
    Away,
}

impl SystemProfile {
    /// Both reserved profiles, in registration order.
    pub const ALL: [Self; 2] = [Self::Default, Self::Away];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Away => "Away",
        }
    }

    /// Match a raw name against the reserved names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

/// A profile declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomProfile(String);

impl CustomProfile {
    /// Wrap a declared name. Returns `None` for the reserved names.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if SystemProfile::from_name(&name).is_some() {
            None
        } else {
            Some(Self(name))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CustomProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Name of any profile, reserved or declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileName {
    System(SystemProfile),
    Custom(CustomProfile),
}

impl ProfileName {
    pub const DEFAULT: Self = Self::System(SystemProfile::Default);
    pub const AWAY: Self = Self::System(SystemProfile::Away);

    /// Classify a raw name as reserved or custom.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match SystemProfile::from_name(name) {
            Some(system) => Self::System(system),
            None => Self::Custom(CustomProfile(name.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System(system) => system.as_str(),
            Self::Custom(custom) => custom.as_str(),
        }
    }
}

impl From<SystemProfile> for ProfileName {
    fn from(value: SystemProfile) -> Self {
        Self::System(value)
    }
}

impl From<CustomProfile> for ProfileName {
    fn from(value: CustomProfile) -> Self {
        Self::Custom(value)
    }
}

impl PartialEq<CustomProfile> for ProfileName {
    fn eq(&self, other: &CustomProfile) -> bool {
        matches!(self, Self::Custom(custom) if custom == other)
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProfileName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Start of a part within a profile. The start is kept as declared and parsed
/// on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStart {
    pub part: Part,
    pub from: String,
}

/// An override owned by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEvent {
    pub title: String,
    pub key: OverrideKey,
}

/// A profile after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: ProfileName,
    parts: Vec<PartStart>,
    events: Vec<ProfileEvent>,
}

impl Profile {
    #[must_use]
    pub fn new(name: ProfileName, parts: Vec<PartStart>) -> Self {
        Self {
            name,
            parts,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &ProfileName {
        &self.name
    }

    /// Part starts in declaration order.
    #[must_use]
    pub fn parts(&self) -> &[PartStart] {
        &self.parts
    }

    /// Declared start of a part, if any.
    #[must_use]
    pub fn part_start(&self, part: Part) -> Option<&str> {
        self.parts
            .iter()
            .find(|start| start.part == part)
            .map(|start| start.from.as_str())
    }

    #[must_use]
    pub fn events(&self) -> &[ProfileEvent] {
        &self.events
    }

    /// Identifier of an override within this profile: `profile.title.key`.
    #[must_use]
    pub fn event_id(&self, title: &str, key: &OverrideKey) -> String {
        format!("{}.{title}.{key}", self.name)
    }

    /// Whether an override with the same title and key already exists.
    #[must_use]
    pub fn has_event(&self, title: &str, key: &OverrideKey) -> bool {
        let id = self.event_id(title, key);
        self.events
            .iter()
            .any(|event| self.event_id(&event.title, &event.key) == id)
    }

    /// Record an override. Returns `false`, leaving the profile untouched, if
    /// the same title and key are already present.
    pub fn add_event(&mut self, title: String, key: OverrideKey) -> bool {
        if self.has_event(&title, &key) {
            return false;
        }
        self.events.push(ProfileEvent { title, key });
        true
    }
}
