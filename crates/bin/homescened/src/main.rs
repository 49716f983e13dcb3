//! # homescened — scene resolution daemon
//!
//! Composition root that wires the adapters into the scene manager and runs it.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Resolve the scene configuration and start the scene manager
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use homescene_adapter_virtual::{TracingNotifier, TracingSceneRunner, VirtualTrackerGroup};
use homescene_app::event_bus::InProcessEventBus;
use homescene_app::ports::SystemClock;
use homescene_app::services::scene_manager::SceneManager;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_FILTER};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = config.manager_settings();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        scan_interval_secs = settings.scan_interval.as_secs(),
        "homescened starting"
    );

    // Event bus
    let bus = Arc::new(InProcessEventBus::default());

    // Adapters
    let declaration = &config.scenes_config;
    let trackers = Arc::new(VirtualTrackerGroup::new(
        declaration.trackers.iter().cloned(),
        Arc::clone(&bus),
    ));
    let runner = Arc::new(TracingSceneRunner::default());
    let notifier = TracingNotifier::default();

    // Scene manager
    let manager = SceneManager::initialize(
        declaration.resolve(),
        SystemClock,
        trackers,
        runner,
        Arc::clone(&bus),
        &notifier,
    )?;
    let handle = manager.spawn(settings);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown().await?;

    Ok(())
}
