//! # homescene-adapter-virtual
//!
//! Stand-ins for the home automation host, used by `homescened` and tests.
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualTrackerGroup`] | `PresenceSource` | Aggregates in-memory `device_tracker.*` states into `group.homescene_trackers` |
//! | [`TracingSceneRunner`] | `SceneRunner` | Logs the scene script instead of executing it |
//! | [`TracingNotifier`] | `Notifier` | Logs notifications at error level |
//!
//! ## Dependency rule
//!
//! Depends on `homescene-app` (port traits) and `homescene-domain` only.

mod notifier;
mod script;
mod trackers;

pub use notifier::TracingNotifier;
pub use script::TracingSceneRunner;
pub use trackers::{GROUP_ENTITY_ID, VirtualTrackerGroup};
