//! Error types for the interaction-analysis engine.
//!
//! Nothing here ever reaches the host: detector and sink failures are
//! caught at the dispatch site and degrade to "no detection this event",
//! construction failures degrade the whole agent to a documented default
//! result. The typed error exists so those sites can log something useful.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    /// A config value the engine cannot operate with.
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// A config-supplied pattern failed to compile.
    #[error("clickable pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    /// History contents violated a detector's expectations.
    #[error("history unavailable to detector {detector}: {reason}")]
    History {
        detector: &'static str,
        reason: String,
    },

    /// The indicator store rejected an update.
    #[error("indicator store rejected update for {name}: {reason}")]
    Sink { name: String, reason: String },
}
