//! # homescene-domain
//!
//! Pure domain model for the homescene scene manager.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, local timestamps, weekday names
//! - Define **Parts** (named segments of the day: morning, noon, …)
//! - Define **Profiles** (bundles of part start times, system or custom)
//! - Define **Overrides** (date or weekday rules that switch the profile for a day)
//! - Define **Scenes** (the resolved action name and its opaque script payload)
//! - Define **Presence** (aggregate tracker state → home / away)
//! - Define **Events** (state-change records carried on the bus)
//! - Resolve a raw configuration declaration into an immutable [`Configuration`](configuration::Configuration)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod configuration;
pub mod event;
pub mod overrides;
pub mod part;
pub mod presence;
pub mod profile;
pub mod scene;
