//! Scene engine — derives the active profile, part and scene on every tick.
//!
//! Each [`tick`](SceneEngine::tick) rebuilds a [`Snapshot`] from scratch, in a
//! fixed order where every step reads only what earlier steps produced:
//!
//! 1. capture the clock and derive the weekday
//! 2. collect today's overrides (date and weekday keys alike)
//! 3. pick the active profile from those overrides
//! 4. find the active part in that profile
//! 5. read presence
//! 6. pick the scene (`Away` when nobody is home, else the part's scene)
//!
//! The new snapshot replaces the old one in a single assignment. When the
//! scene differs from the previous tick's, the new scene's script runs once.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Serialize;

use homescene_domain::configuration::Configuration;
use homescene_domain::overrides::ProfileOverride;
use homescene_domain::part::Part;
use homescene_domain::presence::Presence;
use homescene_domain::profile::{PartStart, Profile, ProfileName};
use homescene_domain::scene::SceneId;
use homescene_domain::time::{self, LocalTimestamp};

use crate::ports::{PresenceSource, SceneRunner};

/// Everything one tick resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub current_date_time: LocalTimestamp,
    pub weekday: Weekday,
    pub events_of_today: Vec<ProfileOverride>,
    pub profile: ProfileName,
    pub part: Part,
    pub is_away: bool,
    pub scene: SceneId,
}

impl Snapshot {
    /// Today's overrides as `"Title (Profile), …"`.
    #[must_use]
    pub fn events_of_today_titles(&self) -> String {
        self.events_of_today
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A scene transition detected by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChange {
    pub from: SceneId,
    pub to: SceneId,
}

/// Per-tick scene resolution over an immutable [`Configuration`].
///
/// The engine is not meant for concurrent use: callers serialize `tick` and
/// `run_current_scene` (see [`SceneManager`](crate::services::scene_manager::SceneManager)).
pub struct SceneEngine<P, R> {
    configuration: Configuration,
    presence: P,
    runner: R,
    snapshot: Option<Snapshot>,
}

impl<P, R> SceneEngine<P, R>
where
    P: PresenceSource,
    R: SceneRunner,
{
    /// Create an engine in the uninitialized state (no snapshot yet).
    pub fn new(configuration: Configuration, presence: P, runner: R) -> Self {
        Self {
            configuration,
            presence,
            runner,
            snapshot: None,
        }
    }

    /// Recompute the snapshot for `now` and run the new scene if it changed.
    ///
    /// The first tick never runs a scene: there is nothing to compare with.
    pub fn tick(&mut self, now: LocalTimestamp) -> Option<SceneChange> {
        tracing::debug!(%now, "tick start");

        let weekday = time::weekday_of(now);
        let events_of_today = self.configuration.overrides().applying_on(now);
        let profile = self.resolve_profile(&events_of_today);
        let part = self.resolve_part(&profile, now);
        let is_away = self.resolve_away();
        let scene = SceneId::resolve(part, is_away);

        let previous = self.snapshot.as_ref().map(|snapshot| snapshot.scene);
        self.snapshot = Some(Snapshot {
            current_date_time: now,
            weekday,
            events_of_today,
            profile,
            part,
            is_away,
            scene,
        });

        tracing::debug!(%scene, %part, is_away, "tick completed");

        match previous {
            Some(from) if from != scene => {
                tracing::info!(%from, to = %scene, "scene changed");
                self.run_current_scene();
                Some(SceneChange { from, to: scene })
            }
            _ => None,
        }
    }

    /// Hand the current scene's script to the runner.
    ///
    /// Does nothing before the first tick, or when the scene has no script.
    pub fn run_current_scene(&self) {
        let Some(scene) = self.current_scene() else {
            tracing::debug!("no scene resolved yet");
            return;
        };
        match self.configuration.scene(scene) {
            Some(configured) => {
                tracing::debug!(%scene, "invoking scene script");
                self.runner.run(scene, &configured.script);
            }
            None => tracing::debug!(%scene, "no script configured for scene"),
        }
    }

    /// Start at `Default`; each of today's overrides replaces the profile
    /// unless the last declared custom profile is already active.
    fn resolve_profile(&self, events: &[ProfileOverride]) -> ProfileName {
        let sticky = self.configuration.last_custom_profile();
        let mut profile = ProfileName::DEFAULT;

        for event in events {
            let is_sticky = sticky.is_some_and(|last| profile == *last);
            if !is_sticky {
                profile = ProfileName::Custom(event.profile.clone());
            }
        }

        tracing::debug!(%profile, "profile of today");
        profile
    }

    /// Scan the profile's parts in declaration order; the last one whose start
    /// is not after `now` wins. `Night` when none has started.
    fn resolve_part(&self, profile: &ProfileName, now: LocalTimestamp) -> Part {
        let Some(resolved) = self.configuration.profile(profile) else {
            tracing::warn!(%profile, "profile not found, using fallback part");
            return Part::fallback();
        };

        let current_time = now.time();
        let mut part = Part::fallback();

        for start in resolved.parts() {
            match time::parse_time_of_day(&start.from) {
                Ok(from) if current_time >= from => part = start.part,
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(
                        %profile,
                        part = %start.part,
                        error = %err,
                        "skipping part with invalid start"
                    );
                }
            }
        }

        part
    }

    /// Away when the aggregate state is an away state. A failed read keeps
    /// the previous tick's value.
    fn resolve_away(&self) -> bool {
        match self.presence.aggregate_state() {
            Ok(state) => {
                let presence = Presence::from_state(&state);
                tracing::debug!(%state, ?presence, "presence read");
                presence.is_away()
            }
            Err(err) => {
                let previous = self.is_away().unwrap_or(false);
                tracing::error!(error = %err, previous, "failed to read presence");
                previous
            }
        }
    }

    /// The latest snapshot, `None` before the first tick.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn current_date_time(&self) -> Option<LocalTimestamp> {
        self.snapshot.as_ref().map(|s| s.current_date_time)
    }

    #[must_use]
    pub fn weekday(&self) -> Option<Weekday> {
        self.snapshot.as_ref().map(|s| s.weekday)
    }

    #[must_use]
    pub fn current_profile(&self) -> Option<&ProfileName> {
        self.snapshot.as_ref().map(|s| &s.profile)
    }

    #[must_use]
    pub fn day_part(&self) -> Option<Part> {
        self.snapshot.as_ref().map(|s| s.part)
    }

    #[must_use]
    pub fn is_away(&self) -> Option<bool> {
        self.snapshot.as_ref().map(|s| s.is_away)
    }

    #[must_use]
    pub fn current_scene(&self) -> Option<SceneId> {
        self.snapshot.as_ref().map(|s| s.scene)
    }

    #[must_use]
    pub fn events_of_today(&self) -> Option<&[ProfileOverride]> {
        self.snapshot.as_ref().map(|s| s.events_of_today.as_slice())
    }

    /// Today's overrides as `"Title (Profile), …"`.
    #[must_use]
    pub fn events_of_today_titles(&self) -> Option<String> {
        self.snapshot.as_ref().map(Snapshot::events_of_today_titles)
    }

    /// Part starts and override titles of any configured profile.
    #[must_use]
    pub fn profile_data(&self, profile: &ProfileName) -> Option<BTreeMap<String, String>> {
        self.configuration.profile_data(profile)
    }

    /// Part starts of the active profile, in declaration order.
    #[must_use]
    pub fn current_profile_parts(&self) -> Option<&[PartStart]> {
        let profile = self.current_profile()?;
        Some(
            self.configuration
                .profile(profile)
                .map_or(&[][..], Profile::parts),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use homescene_domain::configuration::{
        ConfigurationDeclaration, DefaultProfileDeclaration, OverrideDeclaration,
        PartDeclaration, ProfileDeclaration, SceneDeclaration,
    };
    use homescene_domain::error::PresenceError;
    use homescene_domain::scene::ScriptPayload;
    use std::sync::Mutex;

    // ── Fake presence ──────────────────────────────────────────────

    struct FakePresence {
        state: Mutex<Option<String>>,
    }

    impl FakePresence {
        fn home() -> Self {
            Self {
                state: Mutex::new(Some("home".to_string())),
            }
        }

        fn set(&self, state: Option<&str>) {
            *self.state.lock().unwrap() = state.map(str::to_string);
        }
    }

    impl PresenceSource for FakePresence {
        fn entity_id(&self) -> &str {
            "group.homescene_trackers"
        }

        fn aggregate_state(&self) -> Result<String, PresenceError> {
            self.state
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| PresenceError::Missing {
                    entity_id: self.entity_id().to_string(),
                })
        }
    }

    // ── Spy runner ─────────────────────────────────────────────────

    #[derive(Default)]
    struct SpyRunner {
        runs: Mutex<Vec<(SceneId, ScriptPayload)>>,
    }

    impl SpyRunner {
        fn scenes(&self) -> Vec<SceneId> {
            self.runs.lock().unwrap().iter().map(|(s, _)| *s).collect()
        }
    }

    impl SceneRunner for SpyRunner {
        fn run(&self, scene: SceneId, script: &ScriptPayload) {
            self.runs.lock().unwrap().push((scene, script.clone()));
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn at(date: (i32, u32, u32), hms: (u32, u32, u32)) -> LocalTimestamp {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hms.0, hms.1, hms.2)
            .unwrap()
    }

    /// 2024-07-01 is a Monday.
    const MONDAY: (i32, u32, u32) = (2024, 7, 1);
    const TUESDAY: (i32, u32, u32) = (2024, 7, 2);

    fn script(name: &str) -> ScriptPayload {
        serde_json::json!([{ "service": format!("script.{name}") }])
    }

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
                parts: vec![
                    PartDeclaration::new("Morning", "09:00:00"),
                    PartDeclaration::new("Afternoon", "13:00:00"),
                ],
            }],
            events: Vec::new(),
            trackers: vec!["device_tracker.alice".to_string()],
            scenes: ["Morning", "Afternoon", "Evening", "Night", "Away"]
                .into_iter()
                .map(|name| SceneDeclaration {
                    scene: name.to_string(),
                    script: script(&name.to_lowercase()),
                })
                .collect(),
        }
    }

    fn override_on(
        profile: &str,
        title: &str,
        date: Option<&str>,
        day: Option<&str>,
    ) -> OverrideDeclaration {
        OverrideDeclaration {
            profile: profile.to_string(),
            title: title.to_string(),
            date: date.map(str::to_string),
            day: day.map(str::to_string),
        }
    }

    fn make_engine(decl: &ConfigurationDeclaration) -> SceneEngine<FakePresence, SpyRunner> {
        let configuration = decl.resolve().into_configuration().unwrap();
        SceneEngine::new(configuration, FakePresence::home(), SpyRunner::default())
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[test]
    fn should_start_uninitialized() {
        let engine = make_engine(&declaration());
        assert!(engine.snapshot().is_none());
        assert!(engine.current_scene().is_none());
        assert!(engine.events_of_today_titles().is_none());
    }

    #[test]
    fn should_pick_latest_started_part() {
        let mut engine = make_engine(&declaration());

        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Morning));

        engine.tick(at(MONDAY, (20, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Evening));
    }

    #[test]
    fn should_fall_back_to_night_before_first_part() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (3, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Night));
        assert_eq!(engine.current_scene(), Some(SceneId::Night));
    }

    #[test]
    fn should_include_the_exact_start_second() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (18, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Evening));
    }

    #[test]
    fn should_prefer_last_declared_part_over_chronological_order() {
        let mut decl = declaration();
        decl.default_profile.parts = vec![
            PartDeclaration::new("Evening", "18:00:00"),
            PartDeclaration::new("Morning", "06:00:00"),
        ];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (20, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Morning));
    }

    #[test]
    fn should_skip_part_with_invalid_start() {
        let mut decl = declaration();
        decl.default_profile.parts = vec![
            PartDeclaration::new("Morning", "06:00:00"),
            PartDeclaration::new("Evening", "around six"),
        ];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (20, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Morning));
    }

    #[test]
    fn should_fall_back_to_night_when_every_start_is_invalid() {
        let mut decl = declaration();
        decl.default_profile.parts = vec![PartDeclaration::new("Morning", "6am")];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Night));
    }

    #[test]
    fn should_resolve_away_scene_when_nobody_is_home() {
        let mut engine = make_engine(&declaration());
        engine.presence.set(Some("not_home"));

        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Morning));
        assert_eq!(engine.is_away(), Some(true));
        assert_eq!(engine.current_scene(), Some(SceneId::Away));
    }

    #[test]
    fn should_treat_off_as_away() {
        let mut engine = make_engine(&declaration());
        engine.presence.set(Some("off"));
        engine.tick(at(MONDAY, (20, 0, 0)));
        assert_eq!(engine.current_scene(), Some(SceneId::Away));
    }

    #[test]
    fn should_keep_previous_presence_when_read_fails() {
        let mut engine = make_engine(&declaration());
        engine.presence.set(Some("not_home"));
        engine.tick(at(MONDAY, (10, 0, 0)));

        engine.presence.set(None);
        engine.tick(at(MONDAY, (10, 1, 0)));
        assert_eq!(engine.is_away(), Some(true));
        assert_eq!(engine.current_scene(), Some(SceneId::Away));
    }

    #[test]
    fn should_assume_home_when_first_presence_read_fails() {
        let mut engine = make_engine(&declaration());
        engine.presence.set(None);
        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.is_away(), Some(false));
        assert_eq!(engine.current_scene(), Some(SceneId::Morning));
    }

    #[test]
    fn should_switch_profile_on_date_override() {
        let mut decl = declaration();
        decl.events = vec![override_on("Trip", "Vacation", Some("2024-07-01"), None)];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (8, 0, 0)));
        assert_eq!(engine.current_profile(), Some(&ProfileName::parse("Trip")));
        // Trip's morning starts at 09:00, so 08:00 is still night.
        assert_eq!(engine.day_part(), Some(Part::Night));

        engine.tick(at(MONDAY, (14, 0, 0)));
        assert_eq!(engine.day_part(), Some(Part::Afternoon));
        assert_eq!(engine.events_of_today_titles().as_deref(), Some("Vacation (Trip)"));
    }

    #[test]
    fn should_expose_profile_data_of_overridden_profile() {
        let mut decl = declaration();
        decl.events = vec![override_on("Trip", "Vacation", Some("2024-07-01"), None)];
        let mut engine = make_engine(&decl);
        assert!(engine.current_profile_parts().is_none());

        engine.tick(at(MONDAY, (10, 0, 0)));

        let parts = engine.current_profile_parts().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].part, Part::Morning);
        assert_eq!(parts[0].from, "09:00:00");
        assert_eq!(parts[1].part, Part::Afternoon);

        let trip = engine.profile_data(&ProfileName::parse("Trip")).unwrap();
        assert_eq!(trip.get("Morning").map(String::as_str), Some("09:00:00"));
        assert_eq!(trip.get("Vacation").map(String::as_str), Some("2024-07-01"));

        let default = engine.profile_data(&ProfileName::DEFAULT).unwrap();
        assert_eq!(default.get("Evening").map(String::as_str), Some("18:00:00"));
        assert!(engine.profile_data(&ProfileName::parse("Nope")).is_none());
    }

    #[test]
    fn should_switch_profile_on_weekday_override() {
        let mut decl = declaration();
        decl.events = vec![override_on("Trip", "Remote", None, Some("Tuesday"))];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.current_profile(), Some(&ProfileName::DEFAULT));

        engine.tick(at(TUESDAY, (10, 0, 0)));
        assert_eq!(engine.current_profile(), Some(&ProfileName::parse("Trip")));
        assert_eq!(engine.weekday(), Some(Weekday::Tue));
    }

    #[test]
    fn should_collect_date_and_weekday_overrides_of_the_same_day() {
        let mut decl = declaration();
        decl.events = vec![
            override_on("Trip", "Remote", None, Some("Monday")),
            override_on("Trip", "Vacation", Some("2024-07-01"), None),
        ];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.events_of_today().map(<[_]>::len), Some(2));
    }

    #[test]
    fn should_keep_last_declared_custom_profile_once_selected() {
        let mut decl = declaration();
        decl.profiles.push(ProfileDeclaration {
            profile: "Guests".to_string(),
            parts: vec![PartDeclaration::new("Noon", "11:00:00")],
        });
        decl.events = vec![
            override_on("Guests", "Visit", None, Some("Monday")),
            override_on("Trip", "Remote", None, Some("Monday")),
        ];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (12, 0, 0)));
        assert_eq!(engine.current_profile(), Some(&ProfileName::parse("Guests")));
        assert_eq!(engine.day_part(), Some(Part::Noon));
    }

    #[test]
    fn should_let_later_override_replace_earlier_non_sticky_profile() {
        let mut decl = declaration();
        decl.profiles.push(ProfileDeclaration {
            profile: "Guests".to_string(),
            parts: Vec::new(),
        });
        decl.events = vec![
            override_on("Trip", "Remote", None, Some("Monday")),
            override_on("Guests", "Visit", None, Some("Monday")),
        ];
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (12, 0, 0)));
        assert_eq!(engine.current_profile(), Some(&ProfileName::parse("Guests")));
        // Guests declares no parts at all.
        assert_eq!(engine.day_part(), Some(Part::Night));
    }

    #[test]
    fn should_not_run_scene_on_first_tick() {
        let mut engine = make_engine(&declaration());
        let change = engine.tick(at(MONDAY, (10, 0, 0)));
        assert!(change.is_none());
        assert!(engine.runner.scenes().is_empty());
    }

    #[test]
    fn should_run_new_scene_once_when_scene_changes() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (10, 0, 0)));

        let change = engine.tick(at(MONDAY, (19, 0, 0)));
        assert_eq!(
            change,
            Some(SceneChange {
                from: SceneId::Morning,
                to: SceneId::Evening
            })
        );
        let runs = engine.runner.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0], (SceneId::Evening, script("evening")));
    }

    #[test]
    fn should_not_run_scene_when_resolution_is_unchanged() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (10, 0, 0)));
        let change = engine.tick(at(MONDAY, (11, 0, 0)));

        assert!(change.is_none());
        assert!(engine.runner.scenes().is_empty());
    }

    #[test]
    fn should_be_idempotent_for_the_same_clock_value() {
        let mut engine = make_engine(&declaration());
        let now = at(MONDAY, (20, 0, 0));

        engine.tick(now);
        let first = engine.snapshot().cloned();
        engine.tick(now);
        engine.tick(now);

        assert_eq!(engine.snapshot().cloned(), first);
        assert!(engine.runner.scenes().is_empty());
    }

    #[test]
    fn should_run_away_scene_when_occupants_leave() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (10, 0, 0)));

        engine.presence.set(Some("not_home"));
        engine.tick(at(MONDAY, (10, 1, 0)));

        assert_eq!(engine.runner.scenes(), vec![SceneId::Away]);
    }

    #[test]
    fn should_skip_silently_when_scene_has_no_script() {
        let mut decl = declaration();
        decl.scenes.retain(|scene| scene.scene != "Evening");
        let mut engine = make_engine(&decl);

        engine.tick(at(MONDAY, (10, 0, 0)));
        let change = engine.tick(at(MONDAY, (19, 0, 0)));

        assert!(change.is_some());
        assert!(engine.runner.scenes().is_empty());
    }

    #[test]
    fn should_run_current_scene_on_demand() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (14, 0, 0)));

        engine.run_current_scene();
        engine.run_current_scene();
        assert_eq!(engine.runner.scenes(), vec![SceneId::Morning, SceneId::Morning]);
    }

    #[test]
    fn should_do_nothing_when_running_scene_before_first_tick() {
        let engine = make_engine(&declaration());
        engine.run_current_scene();
        assert!(engine.runner.scenes().is_empty());
    }

    #[test]
    fn should_list_no_titles_on_a_day_without_overrides() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (10, 0, 0)));
        assert_eq!(engine.events_of_today_titles().as_deref(), Some(""));
    }

    #[test]
    fn should_serialize_snapshot() {
        let mut engine = make_engine(&declaration());
        engine.tick(at(MONDAY, (10, 0, 0)));
        let json = serde_json::to_value(engine.snapshot().unwrap()).unwrap();
        assert_eq!(json["profile"], "Default");
        assert_eq!(json["part"], "Morning");
        assert_eq!(json["scene"], "Morning");
        assert_eq!(json["is_away"], false);
    }
}
