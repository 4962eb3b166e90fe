//! Interaction Analysis Agent for Zentinel
//!
//! Classifies whether a live session is driven by a human or by an
//! automation agent (headless browser, scripted driver, AI-operated
//! browser tool) from low-level interaction events, and emits
//! confidence-scored indicators.
//!
//! # Features
//!
//! - Bounded rolling histories of pointer, click, and scroll samples
//! - Five pattern detectors: central clicks, teleport clicks, non-human
//!   scrolling, artificial click timing, missing mouse trails
//! - Confidence-scored indicators with bounded audit detail
//! - Descriptive telemetry (counts, distances, velocities, rates)
//! - Duration-bounded collection sessions with progress reporting
//! - Fail-open throughout: the agent never errors back to the host
//!
//! # Example
//!
//! ```ignore
//! use zentinel_agent_interaction_analysis::{
//!     InteractionAnalysisAgent, InteractionAnalysisConfig,
//! };
//!
//! let agent = InteractionAnalysisAgent::new(InteractionAnalysisConfig::default());
//! // ... bridge page events into agent.record_event(...) ...
//! let report = agent.collect_behavioral_data(Some(10_000)).await;
//! println!("{}", report.summary.summary);
//! ```

pub mod agent;
pub mod cache;
pub mod config;
pub mod detectors;
pub mod error;
pub mod events;
pub mod history;
pub mod indicators;
pub mod session;
pub mod stats;
pub mod telemetry;

pub use agent::{CollectionProgress, CollectionReport, InteractionAnalysisAgent, ReportMetadata};
pub use config::InteractionAnalysisConfig;
pub use error::DetectionError;
pub use events::InteractionEvent;
pub use indicators::{DetectionSummary, IndicatorSnapshot, IndicatorStore, RiskLevel};
pub use telemetry::TelemetryStats;
