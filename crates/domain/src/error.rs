//! Domain error types.
//!
//! Each concern has its own typed error; the app layer wraps them via `#[from]`.
//! Configuration problems are not errors in this sense: they accumulate into
//! [`ConfigurationIssues`](crate::configuration::ConfigurationIssues) and only
//! become a [`ConfigurationError`] once the whole declaration has been read.

use crate::configuration::ConfigurationIssues;

/// The resolved configuration cannot be activated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The resolver recorded at least one warning or error.
    #[error("configuration has {} issue(s)", .0.len())]
    Invalid(ConfigurationIssues),

    /// A tracker outside the supported domains was declared.
    #[error("{tracker} is not a supported tracker")]
    UnsupportedTracker { tracker: String },
}

/// A part start time could not be parsed as `HH:MM:SS`.
#[derive(Debug, thiserror::Error)]
#[error("{value:?} is not a valid HH:MM:SS time")]
pub struct TimeOfDayError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// The aggregate presence state could not be read.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The tracker group entity has no state yet.
    #[error("no state available for {entity_id}")]
    Missing { entity_id: String },

    /// The presence source failed for another reason.
    #[error("presence source unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}
