//! Virtual tracker group — in-memory `device_tracker.*` states.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use homescene_app::event_bus::InProcessEventBus;
use homescene_app::ports::{EventPublisher, PresenceSource};
use homescene_domain::error::PresenceError;
use homescene_domain::event::Event;

/// Entity id of the aggregate state.
pub const GROUP_ENTITY_ID: &str = "group.homescene_trackers";

const HOME: &str = "home";
const NOT_HOME: &str = "not_home";
const UNKNOWN: &str = "unknown";

/// A group of simulated trackers.
///
/// The group is `home` when any member is `home`, `not_home` otherwise and
/// `unknown` when it has no members. Every change of that aggregate is
/// published on the bus as a state change of [`GROUP_ENTITY_ID`].
pub struct VirtualTrackerGroup {
    members: Mutex<BTreeMap<String, String>>,
    bus: Arc<InProcessEventBus>,
}

impl VirtualTrackerGroup {
    /// Create a group whose members all start `home`.
    pub fn new<I, S>(trackers: I, bus: Arc<InProcessEventBus>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = trackers
            .into_iter()
            .map(|tracker| (tracker.into(), HOME.to_string()))
            .collect();
        Self {
            members: Mutex::new(members),
            bus,
        }
    }

    /// State of one member.
    #[must_use]
    pub fn state_of(&self, tracker: &str) -> Option<String> {
        self.lock_members().get(tracker).cloned()
    }

    /// Set the state of one member and announce the new aggregate if it moved.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::Missing`] when `tracker` is not a member.
    pub async fn set_state(&self, tracker: &str, state: &str) -> Result<(), PresenceError> {
        let (before, after) = {
            let mut members = self.lock_members();
            let before = aggregate(&members);
            let slot = members
                .get_mut(tracker)
                .ok_or_else(|| PresenceError::Missing {
                    entity_id: tracker.to_string(),
                })?;
            *slot = state.to_string();
            (before, aggregate(&members))
        };

        tracing::debug!(tracker, state, group = after, "tracker updated");
        if before != after {
            self.bus
                .publish(Event::state_changed(GROUP_ENTITY_ID, Some(before), after))
                .await;
        }
        Ok(())
    }

    fn lock_members(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.members
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn aggregate(members: &BTreeMap<String, String>) -> &'static str {
    if members.is_empty() {
        UNKNOWN
    } else if members.values().any(|state| state == HOME) {
        HOME
    } else {
        NOT_HOME
    }
}

impl PresenceSource for VirtualTrackerGroup {
    fn entity_id(&self) -> &str {
        GROUP_ENTITY_ID
    }

    fn aggregate_state(&self) -> Result<String, PresenceError> {
        Ok(aggregate(&self.lock_members()).to_string())
    }
}
