//! Configuration resolver — turns declarations into a [`Configuration`].
//!
//! Stages run in order: profiles, overrides, scenes. Each stage only reads
//! what earlier stages produced, and every dropped entry leaves an issue.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::declaration::{
    OverrideDeclaration, PartDeclaration, ProfileDeclaration, SceneDeclaration,
};
use super::{Configuration, ConfigurationIssues, Resolution};
use crate::overrides::{OverrideIndex, OverrideKey, ProfileOverride};
use crate::part::Part;
use crate::profile::{CustomProfile, PartStart, Profile, ProfileName, SystemProfile};
use crate::scene::{Scene, SceneId};
use crate::time::{self, DATE_FORMAT};

/// Builds a [`Configuration`] from borrowed declarations.
///
/// The resolver owns its accumulators and hands them over as one immutable
/// configuration in [`resolve`](Self::resolve).
pub struct Resolver<'a> {
    default_parts: &'a [PartDeclaration],
    declared_profiles: &'a [ProfileDeclaration],
    declared_overrides: &'a [OverrideDeclaration],
    trackers: &'a [String],
    declared_scenes: &'a [SceneDeclaration],

    profiles: HashMap<ProfileName, Profile>,
    custom_profiles: Vec<CustomProfile>,
    overrides: OverrideIndex,
    scenes: HashMap<SceneId, Scene>,
    issues: ConfigurationIssues,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(
        default_parts: &'a [PartDeclaration],
        profiles: &'a [ProfileDeclaration],
        overrides: &'a [OverrideDeclaration],
        trackers: &'a [String],
        scenes: &'a [SceneDeclaration],
    ) -> Self {
        Self {
            default_parts,
            declared_profiles: profiles,
            declared_overrides: overrides,
            trackers,
            declared_scenes: scenes,
            profiles: HashMap::new(),
            custom_profiles: Vec::new(),
            overrides: OverrideIndex::default(),
            scenes: HashMap::new(),
            issues: ConfigurationIssues::default(),
        }
    }

    /// Run every stage and return the configuration with the issues found.
    #[must_use]
    pub fn resolve(mut self) -> Resolution {
        self.resolve_profiles();
        self.resolve_overrides();
        self.resolve_scenes();

        Resolution {
            configuration: Configuration {
                profiles: self.profiles,
                custom_profiles: self.custom_profiles,
                overrides: self.overrides,
                trackers: self.trackers.to_vec(),
                scenes: self.scenes,
            },
            issues: self.issues,
        }
    }

    fn resolve_profiles(&mut self) {
        let mut reserved = false;
        for decl in self.declared_profiles {
            if let Some(system) = SystemProfile::from_name(&decl.profile) {
                self.issues
                    .error(format!("{} profile is a system profile", system.as_str()));
                reserved = true;
            }
        }
        if reserved {
            return;
        }

        let default_parts = self.resolve_parts(SystemProfile::Default.as_str(), self.default_parts);
        self.profiles.insert(
            ProfileName::DEFAULT,
            Profile::new(ProfileName::DEFAULT, default_parts),
        );
        self.profiles.insert(
            ProfileName::AWAY,
            Profile::new(ProfileName::AWAY, Vec::new()),
        );

        for decl in self.declared_profiles {
            let Some(custom) = CustomProfile::new(decl.profile.as_str()) else {
                continue;
            };
            let name = ProfileName::Custom(custom.clone());
            if self.profiles.contains_key(&name) {
                self.issues
                    .warn(format!("profile {custom} is declared more than once"));
                continue;
            }

            let parts = self.resolve_parts(custom.as_str(), &decl.parts);
            self.profiles.insert(name.clone(), Profile::new(name, parts));
            self.custom_profiles.push(custom);
        }
    }

    fn resolve_parts(&mut self, profile: &str, decls: &[PartDeclaration]) -> Vec<PartStart> {
        let mut parts: Vec<PartStart> = Vec::with_capacity(decls.len());

        for decl in decls {
            let Some(part) = Part::from_name(&decl.name) else {
                self.issues
                    .warn(format!("{profile} declares unknown part {}", decl.name));
                continue;
            };
            if parts.iter().any(|start| start.part == part) {
                self.issues
                    .warn(format!("{profile} already contains part {part}"));
                continue;
            }

            tracing::info!(%profile, %part, from = %decl.from, "set part start");
            parts.push(PartStart {
                part,
                from: decl.from.clone(),
            });
        }

        parts
    }

    fn resolve_overrides(&mut self) {
        for decl in self.declared_overrides {
            let title = &decl.title;
            let name = ProfileName::parse(&decl.profile);

            if !self.profiles.contains_key(&name) {
                self.issues.warn(format!(
                    "cannot add event {title} since profile {name} is undefined"
                ));
                continue;
            }
            let ProfileName::Custom(custom) = name.clone() else {
                self.issues.warn(format!(
                    "cannot add event {title} since profile {name} is a system profile"
                ));
                continue;
            };
            let Some(key) = self.resolve_override_key(decl) else {
                continue;
            };

            let Some(profile) = self.profiles.get_mut(&name) else {
                continue;
            };
            if !profile.add_event(title.clone(), key.clone()) {
                self.issues
                    .warn(format!("{name} already contains event {title} on {key}"));
                continue;
            }

            tracing::info!(profile = %name, %title, %key, "add override");
            self.overrides.insert(
                key,
                ProfileOverride {
                    profile: custom,
                    title: title.clone(),
                },
            );
        }
    }

    fn resolve_override_key(&mut self, decl: &OverrideDeclaration) -> Option<OverrideKey> {
        let title = &decl.title;
        match (decl.date.as_deref(), decl.day.as_deref()) {
            (Some(date), None) => match NaiveDate::parse_from_str(date.trim(), DATE_FORMAT) {
                Ok(date) => Some(OverrideKey::Date(date)),
                Err(_) => {
                    self.issues
                        .warn(format!("event {title} has invalid date {date}"));
                    None
                }
            },
            (None, Some(day)) => {
                if let Some(day) = time::parse_weekday(day) {
                    Some(OverrideKey::Weekday(day))
                } else {
                    self.issues
                        .warn(format!("event {title} has invalid day {day}"));
                    None
                }
            }
            (Some(_), Some(_)) => {
                self.issues
                    .warn(format!("event {title} declares both a date and a day"));
                None
            }
            (None, None) => {
                self.issues
                    .warn(format!("event {title} declares neither a date nor a day"));
                None
            }
        }
    }

    fn resolve_scenes(&mut self) {
        for decl in self.declared_scenes {
            let Some(id) = SceneId::from_name(&decl.scene) else {
                self.issues.warn(format!("scene {} is invalid", decl.scene));
                continue;
            };

            tracing::info!(scene = %id, "set scene");
            self.scenes.insert(
                id,
                Scene {
                    id,
                    script: decl.script.clone(),
                },
            );
        }
    }
}
