//! Presence port — the aggregate state of every tracked occupant.

use homescene_domain::error::PresenceError;

/// One aggregate state string for all trackers (e.g. `home`, `not_home`).
pub trait PresenceSource {
    /// Entity id of the aggregate, e.g. `group.homescene_trackers`. State
    /// changes of this entity on the bus trigger a refresh.
    fn entity_id(&self) -> &str;

    /// Read the current aggregate state.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError`] when no state can be read; the engine keeps
    /// its previous presence in that case.
    fn aggregate_state(&self) -> Result<String, PresenceError>;
}

impl<T: PresenceSource + ?Sized> PresenceSource for std::sync::Arc<T> {
    fn entity_id(&self) -> &str {
        (**self).entity_id()
    }

    fn aggregate_state(&self) -> Result<String, PresenceError> {
        (**self).aggregate_state()
    }
}
