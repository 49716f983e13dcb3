//! Clock port — where "now" comes from.

use homescene_domain::time::{self, LocalTimestamp};

/// Provides the current local timestamp. Called once per tick.
pub trait Clock {
    fn now(&self) -> LocalTimestamp;
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> LocalTimestamp {
        (**self).now()
    }
}

/// The host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LocalTimestamp {
        time::now()
    }
}
