//! # homescene-app
//!
//! Application layer — the scene resolution engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Clock` — current local timestamp
//!   - `PresenceSource` — aggregate tracker state
//!   - `SceneRunner` — execute a scene's script
//!   - `Notifier` — user-visible setup notifications
//!   - `EventPublisher` — publish bus events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SceneEngine` — per-tick resolution of profile, part and scene
//!   - `SceneManager` — startup validation and the single worker that owns the engine
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homescene-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod scene_engine;
pub mod services;
