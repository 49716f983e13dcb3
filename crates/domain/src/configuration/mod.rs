//! Configuration — the immutable runtime lookup structure built from a
//! declaration.
//!
//! Resolution never fails outright. Every problem becomes a
//! [`ConfigurationIssue`] in an ordered log and the offending entry is dropped;
//! the caller decides what a non-empty log means. The scene manager refuses to
//! start on any issue, warnings included.

mod declaration;
mod resolver;

pub use declaration::{
    ConfigurationDeclaration, DefaultProfileDeclaration, OverrideDeclaration, PartDeclaration,
    ProfileDeclaration, SceneDeclaration,
};
pub use resolver::Resolver;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::overrides::OverrideIndex;
use crate::presence;
use crate::profile::{CustomProfile, Profile, ProfileName};
use crate::scene::{Scene, SceneId};

/// How bad an issue is. Both severities block startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

/// One problem found while resolving a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationIssue {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ConfigurationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warn => write!(f, "WARN - {}", self.message),
            Severity::Error => write!(f, "ERROR - {}", self.message),
        }
    }
}

/// Ordered log of issues. Each entry is mirrored to `tracing` when recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationIssues(Vec<ConfigurationIssue>);

impl ConfigurationIssues {
    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.0.push(ConfigurationIssue {
            severity: Severity::Warn,
            message,
        });
    }

    pub fn error(&mut self, message: String) {
        tracing::error!("{message}");
        self.0.push(ConfigurationIssue {
            severity: Severity::Error,
            message,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationIssue> {
        self.0.iter()
    }
}

impl fmt::Display for ConfigurationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, " - {issue}")?;
        }
        Ok(())
    }
}

/// Output of the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub configuration: Configuration,
    pub issues: ConfigurationIssues,
}

impl Resolution {
    /// Accept the configuration only if resolution recorded no issue at all.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] carrying the whole log otherwise.
    pub fn into_configuration(self) -> Result<Configuration, ConfigurationError> {
        if self.issues.is_empty() {
            Ok(self.configuration)
        } else {
            Err(ConfigurationError::Invalid(self.issues))
        }
    }
}

/// Normalized runtime configuration. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub(crate) profiles: HashMap<ProfileName, Profile>,
    pub(crate) custom_profiles: Vec<CustomProfile>,
    pub(crate) overrides: OverrideIndex,
    pub(crate) trackers: Vec<String>,
    pub(crate) scenes: HashMap<SceneId, Scene>,
}

impl Configuration {
    #[must_use]
    pub fn profile(&self, name: &ProfileName) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Custom profiles in declaration order.
    #[must_use]
    pub fn custom_profiles(&self) -> &[CustomProfile] {
        &self.custom_profiles
    }

    /// The last declared custom profile. Once today's overrides select it,
    /// later overrides no longer change the active profile.
    #[must_use]
    pub fn last_custom_profile(&self) -> Option<&CustomProfile> {
        self.custom_profiles.last()
    }

    #[must_use]
    pub fn overrides(&self) -> &OverrideIndex {
        &self.overrides
    }

    #[must_use]
    pub fn trackers(&self) -> &[String] {
        &self.trackers
    }

    #[must_use]
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(&id)
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Check that every tracker belongs to a supported domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedTracker`] for the first tracker
    /// outside [`presence::TRACKER_DOMAIN`].
    pub fn validate_trackers(&self) -> Result<(), ConfigurationError> {
        match self
            .trackers
            .iter()
            .find(|tracker| !presence::is_supported_tracker(tracker))
        {
            Some(tracker) => Err(ConfigurationError::UnsupportedTracker {
                tracker: tracker.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Flat view of a profile: part name → start, and override title → key.
    #[must_use]
    pub fn profile_data(&self, name: &ProfileName) -> Option<BTreeMap<String, String>> {
        let profile = self.profiles.get(name)?;
        let parts = profile
            .parts()
            .iter()
            .map(|start| (start.part.to_string(), start.from.clone()));
        let events = profile
            .events()
            .iter()
            .map(|event| (event.title.clone(), event.key.to_string()));
        Some(parts.chain(events).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration() -> ConfigurationDeclaration {
        ConfigurationDeclaration {
            default_profile: DefaultProfileDeclaration {
                parts: vec![
                    PartDeclaration::new("Morning", "06:00:00"),
                    PartDeclaration::new("Evening", "18:00:00"),
                ],
            },
            profiles: vec![ProfileDeclaration {
                profile: "Trip".to_string(),
                parts: vec![PartDeclaration::new("Noon", "12:00:00")],
            }],
            events: vec![OverrideDeclaration {
                profile: "Trip".to_string(),
                title: "Vacation".to_string(),
                date: Some("2024-07-01".to_string()),
                day: None,
            }],
            trackers: vec!["device_tracker.alice".to_string()],
            scenes: Vec::new(),
        }
    }

    #[test]
    fn should_display_issue_with_severity_prefix() {
        let mut issues = ConfigurationIssues::default();
        issues.warn("first".to_string());
        issues.error("second".to_string());
        assert_eq!(issues.to_string(), " - WARN - first\n - ERROR - second");
    }

    #[test]
    fn should_accept_resolution_without_issues() {
        let resolution = declaration().resolve();
        assert!(resolution.into_configuration().is_ok());
    }

    #[test]
    fn should_reject_resolution_with_only_warnings() {
        let mut decl = declaration();
        decl.scenes.push(SceneDeclaration {
            scene: "Brunch".to_string(),
            script: serde_json::Value::Null,
        });
        let result = decl.resolve().into_configuration();
        assert!(matches!(result, Err(ConfigurationError::Invalid(issues)) if issues.len() == 1));
    }

    #[test]
    fn should_flatten_profile_parts_and_events() {
        let config = declaration().resolve().configuration;
        let data = config.profile_data(&ProfileName::parse("Trip")).unwrap();
        assert_eq!(data.get("Noon").map(String::as_str), Some("12:00:00"));
        assert_eq!(data.get("Vacation").map(String::as_str), Some("2024-07-01"));
    }

    #[test]
    fn should_return_no_profile_data_for_unknown_profile() {
        let config = declaration().resolve().configuration;
        assert!(config.profile_data(&ProfileName::parse("Nope")).is_none());
    }

    #[test]
    fn should_accept_device_trackers() {
        let config = declaration().resolve().configuration;
        assert!(config.validate_trackers().is_ok());
    }

    #[test]
    fn should_reject_tracker_from_other_domain() {
        let mut decl = declaration();
        decl.trackers.push("switch.garage".to_string());
        let config = decl.resolve().configuration;
        assert!(matches!(
            config.validate_trackers(),
            Err(ConfigurationError::UnsupportedTracker { tracker }) if tracker == "switch.garage"
        ));
    }
}
