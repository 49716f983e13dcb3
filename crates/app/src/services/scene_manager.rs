//! Scene manager — startup validation and the single worker that owns the engine.
//!
//! The engine must never see two ticks at once. Every request (periodic timer,
//! startup refresh, presence change on the bus, explicit calls through the
//! handle) is queued to one worker task that runs them one after the other.
//! Readers get the latest snapshot through a `watch` channel and never observe
//! a half-updated one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use homescene_domain::configuration::Resolution;
use homescene_domain::error::ConfigurationError;
use homescene_domain::event::Event;
use homescene_domain::profile::{PartStart, ProfileName};

use crate::event_bus::InProcessEventBus;
use crate::ports::{Clock, EventPublisher, Notifier, PresenceSource, SceneRunner};
use crate::scene_engine::{SceneEngine, Snapshot};

/// Title of the startup notification.
pub const NOTIFICATION_TITLE: &str = "Scene Manager Setup";

/// Worker settings.
#[derive(Debug, Clone, Copy)]
pub struct ManagerSettings {
    /// Period of the refresh timer.
    pub scan_interval: Duration,
    /// Capacity of the command queue.
    pub queue_capacity: usize,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(60),
            queue_capacity: 32,
        }
    }
}

/// The manager refused to start. The user has been notified.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("scene manager was not initialized")]
    Configuration(#[from] ConfigurationError),
}

/// A handle call could not be served.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The worker has shut down.
    #[error("scene manager is not running")]
    Stopped,
    /// No tick has completed yet.
    #[error("scene manager has not resolved a scene yet")]
    NotInitialized,
}

enum Command {
    Refresh(oneshot::Sender<Option<Snapshot>>),
    RunCurrentScene(oneshot::Sender<()>),
    ProfileData(ProfileName, oneshot::Sender<Option<BTreeMap<String, String>>>),
    CurrentProfileParts(oneshot::Sender<Option<Vec<PartStart>>>),
    Shutdown,
}

/// Owns the engine and its collaborators until [`spawn`](Self::spawn)ed.
pub struct SceneManager<C, P, R> {
    engine: SceneEngine<P, R>,
    clock: C,
    bus: Arc<InProcessEventBus>,
    presence_entity: String,
}

impl<C, P, R> SceneManager<C, P, R>
where
    C: Clock + Send + 'static,
    P: PresenceSource + Send + 'static,
    R: SceneRunner + Send + 'static,
{
    /// Validate a resolution and build the manager.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when the resolution recorded any issue or a
    /// tracker is outside the supported domain. Exactly one notification is
    /// sent through `notifier` in that case.
    pub fn initialize(
        resolution: Resolution,
        clock: C,
        presence: P,
        runner: R,
        bus: Arc<InProcessEventBus>,
        notifier: &impl Notifier,
    ) -> Result<Self, StartupError> {
        let configuration = resolution
            .into_configuration()
            .and_then(|configuration| {
                configuration.validate_trackers()?;
                Ok(configuration)
            })
            .inspect_err(|err| notify_failure(notifier, err))?;

        tracing::info!(
            custom_profiles = configuration.custom_profiles().len(),
            overrides = configuration.overrides().len(),
            scenes = configuration.scene_count(),
            trackers = configuration.trackers().len(),
            "scene manager initialized"
        );

        let presence_entity = presence.entity_id().to_string();
        Ok(Self {
            engine: SceneEngine::new(configuration, presence, runner),
            clock,
            bus,
            presence_entity,
        })
    }

    /// Start the worker task and return a handle to it.
    ///
    /// The worker refreshes once immediately, then on every timer tick and on
    /// every state change of the presence entity.
    #[must_use]
    pub fn spawn(self, settings: ManagerSettings) -> SceneManagerHandle {
        let (commands, queue) = mpsc::channel(settings.queue_capacity.max(1));
        let (snapshots_tx, snapshots) = watch::channel(None);
        let events = self.bus.subscribe();

        tokio::spawn(self.run(queue, events, snapshots_tx, settings.scan_interval));

        SceneManagerHandle {
            commands,
            snapshots,
        }
    }

    async fn run(
        mut self,
        mut queue: mpsc::Receiver<Command>,
        mut events: broadcast::Receiver<Event>,
        snapshots: watch::Sender<Option<Snapshot>>,
        scan_interval: Duration,
    ) {
        let mut timer = tokio::time::interval_at(Instant::now() + scan_interval, scan_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut bus_open = true;

        tracing::debug!("startup refresh");
        self.refresh(&snapshots).await;

        loop {
            tokio::select! {
                command = queue.recv() => match command {
                    Some(Command::Refresh(reply)) => {
                        let snapshot = self.refresh(&snapshots).await;
                        let _ = reply.send(snapshot);
                    }
                    Some(Command::RunCurrentScene(reply)) => {
                        tracing::debug!("running current scene on request");
                        self.engine.run_current_scene();
                        let _ = reply.send(());
                    }
                    Some(Command::ProfileData(profile, reply)) => {
                        let _ = reply.send(self.engine.profile_data(&profile));
                    }
                    Some(Command::CurrentProfileParts(reply)) => {
                        let parts = self.engine.current_profile_parts().map(<[_]>::to_vec);
                        let _ = reply.send(parts);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = timer.tick() => {
                    self.refresh(&snapshots).await;
                }
                event = events.recv(), if bus_open => match event {
                    Ok(event) if event.is_state_change_of(&self.presence_entity) => {
                        tracing::debug!(entity_id = %self.presence_entity, "presence changed");
                        self.refresh(&snapshots).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event bus lagged, refreshing");
                        self.refresh(&snapshots).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => bus_open = false,
                },
            }
        }

        tracing::info!("scene manager stopped");
    }

    async fn refresh(&mut self, snapshots: &watch::Sender<Option<Snapshot>>) -> Option<Snapshot> {
        let now = self.clock.now();
        let change = self.engine.tick(now);
        let snapshot = self.engine.snapshot().cloned();
        snapshots.send_replace(snapshot.clone());

        if let Some(change) = change {
            self.bus
                .publish(Event::scene_changed(change.from, change.to))
                .await;
        }
        snapshot
    }
}

fn notify_failure(notifier: &impl Notifier, err: &ConfigurationError) {
    let message = match err {
        ConfigurationError::Invalid(issues) => {
            format!("Errors while loading configuration:\n{issues}")
        }
        ConfigurationError::UnsupportedTracker { .. } => err.to_string(),
    };
    tracing::error!(%message, "scene manager setup failed");
    notifier.notify(NOTIFICATION_TITLE, &message);
}

/// Cloneable access to a running scene manager.
#[derive(Clone)]
pub struct SceneManagerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Option<Snapshot>>,
}

impl SceneManagerHandle {
    /// Recompute now and return the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is gone.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Snapshot, ManagerError> {
        self.request(Command::Refresh)
            .await?
            .ok_or(ManagerError::NotInitialized)
    }

    /// Run the current scene's script again.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is gone.
    #[tracing::instrument(skip(self))]
    pub async fn run_current_scene(&self) -> Result<(), ManagerError> {
        self.request(Command::RunCurrentScene).await
    }

    /// Part starts and override titles of `profile`, `None` when it is not
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is gone.
    #[tracing::instrument(skip(self))]
    pub async fn profile_data(
        &self,
        profile: ProfileName,
    ) -> Result<Option<BTreeMap<String, String>>, ManagerError> {
        self.request(|reply| Command::ProfileData(profile, reply))
            .await
    }

    /// Part starts of the active profile.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is gone, or
    /// [`ManagerError::NotInitialized`] before the first tick.
    #[tracing::instrument(skip(self))]
    pub async fn current_profile_parts(&self) -> Result<Vec<PartStart>, ManagerError> {
        self.request(Command::CurrentProfileParts)
            .await?
            .ok_or(ManagerError::NotInitialized)
    }

    /// Today's overrides of the latest snapshot as `"Title (Profile), …"`.
    #[must_use]
    pub fn events_of_today_titles(&self) -> Option<String> {
        self.snapshots
            .borrow()
            .as_ref()
            .map(Snapshot::events_of_today_titles)
    }

    /// Latest snapshot, `None` before the first tick completed.
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is gone.
    pub async fn changed(&mut self) -> Result<Snapshot, ManagerError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| ManagerError::Stopped)?;
        self.snapshots
            .borrow_and_update()
            .clone()
            .ok_or(ManagerError::NotInitialized)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ManagerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ManagerError::Stopped)?;
        response.await.map_err(|_| ManagerError::Stopped)
    }

    /// Ask the worker to stop after the requests already queued.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Stopped`] when the worker is already gone.
    pub async fn shutdown(&self) -> Result<(), ManagerError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| ManagerError::Stopped)
    }
}
