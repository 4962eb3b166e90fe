//! Interaction pattern detectors.
//!
//! Each detector is a pure function over the sample history: it reads the
//! rolling buffers, never mutates them, and either proposes one indicator
//! update or stays silent. Detectors run synchronously inside the event
//! that triggered them, so they must stay cheap enough for the pointer-move
//! rate of a live page.

pub mod central_click;
pub mod missing_trail;
pub mod no_movement;
pub mod scroll;
pub mod timing;

pub use central_click::CentralClickDetector;
pub use missing_trail::MissingTrailDetector;
pub use no_movement::NoMovementDetector;
pub use scroll::NonHumanScrollDetector;
pub use timing::ArtificialTimingDetector;

use crate::config::InteractionAnalysisConfig;
use crate::error::DetectionError;
use crate::history::SampleHistory;
use serde_json::{json, Value};

/// Indicator name for repeated dead-center clicks on clickable elements.
pub const CENTRAL_BUTTON_CLICKS: &str = "centralButtonClicks";
/// Indicator name for clicks with no preceding pointer approach.
pub const CLICKS_WITHOUT_MOUSE_MOVEMENT: &str = "clicksWithoutMouseMovement";
/// Indicator name for machine-regular wheel scrolling.
pub const NON_HUMAN_SCROLLING: &str = "nonHumanScrolling";
/// Indicator name for machine-regular inter-click timing.
pub const ARTIFICIAL_TIMING: &str = "artificialTiming";
/// Indicator name for cursor positions with no gradual approach.
pub const MISSING_MOUSE_TRAILS: &str = "missingMouseTrails";

/// Which event kind runs a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Scroll,
}

/// A proposed indicator update from one detector run.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Indicator name, as consumed by the page-side store
    pub indicator: &'static str,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Structured context for post-hoc audit
    pub detail: Value,
}

impl Detection {
    /// Create a detection; confidence is clamped to [0, 1].
    pub fn new(indicator: &'static str, confidence: f64) -> Self {
        Self {
            indicator,
            confidence: confidence.clamp(0.0, 1.0),
            detail: json!({}),
        }
    }

    /// Attach the audit detail payload.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Trait for interaction pattern detectors.
pub trait Detector: Send + Sync {
    /// Short detector name, for logs.
    fn name(&self) -> &'static str;

    /// The indicator this detector proposes.
    fn indicator(&self) -> &'static str;

    /// Which event kind triggers this detector.
    fn trigger(&self) -> Trigger;

    /// The confidence floor below which nothing is emitted.
    fn threshold(&self) -> f64;

    /// Examine the history and possibly propose an indicator update.
    ///
    /// Must not mutate history; an `Err` means "no detection this event"
    /// to the caller, which logs and moves on.
    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError>;
}

/// Build the ordered detector registry for a session.
///
/// Order is load-bearing: for a click the detectors run central-click,
/// no-movement, artificial-timing, missing-trail; the scroll detector runs
/// for wheel events. Disabled detectors are simply absent.
pub fn build_registry(
    config: &InteractionAnalysisConfig,
) -> Result<Vec<Box<dyn Detector>>, DetectionError> {
    let mut registry: Vec<Box<dyn Detector>> = Vec::new();

    if config.detection.central_click {
        registry.push(Box::new(CentralClickDetector::new(
            config.central_click.clone(),
            &config.cache,
        )?));
    }
    if config.detection.no_movement {
        registry.push(Box::new(NoMovementDetector::new(
            config.no_movement.clone(),
            config.session.start_control_id.clone(),
        )));
    }
    if config.detection.timing {
        registry.push(Box::new(ArtificialTimingDetector::new(config.timing.clone())));
    }
    if config.detection.missing_trail {
        registry.push(Box::new(MissingTrailDetector::new(config.missing_trail.clone())));
    }
    if config.detection.scroll {
        registry.push(Box::new(NonHumanScrollDetector::new(config.scroll.clone())));
    }

    Ok(registry)
}
