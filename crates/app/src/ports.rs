//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.
//!
//! Everything the engine calls during a tick is synchronous: a tick runs to
//! completion without suspending.

pub mod clock;
pub mod event_bus;
pub mod notifier;
pub mod presence;
pub mod scene_runner;

pub use clock::{Clock, SystemClock};
pub use event_bus::EventPublisher;
pub use notifier::Notifier;
pub use presence::PresenceSource;
pub use scene_runner::SceneRunner;
