//! Missing-trail ("teleporting cursor") detector.
//!
//! A cursor that lands on a target without ever approaching it is the
//! signature of programmatic placement. This is also the detector most
//! exposed to cold-start noise (page load, focus changes, the user's first
//! contact with the page), so it is gated hard: a warm-up window, a
//! minimum click count, and a conservative emit threshold. Every factor
//! that contributed to the score is recorded in the detail payload.

use super::{Detection, Detector, Trigger, MISSING_MOUSE_TRAILS};
use crate::config::MissingTrailConfig;
use crate::error::DetectionError;
use crate::events::PointerSample;
use crate::history::SampleHistory;
use serde_json::json;

/// Nested activity windows examined before each click, in ms.
const WINDOW_SHORT_MS: u64 = 1000;
const WINDOW_MEDIUM_MS: u64 = 3000;
const WINDOW_LONG_MS: u64 = 5000;

/// Additive confidence weights, one per independent factor.
///
/// Kept as a first-class table so the tuning is inspectable and the
/// composition testable in isolation.
#[derive(Debug, Clone)]
pub struct TrailWeights {
    /// Zero pointer activity in the long window.
    pub silent_long_window: f64,
    /// Sparse activity in the medium window with a meaningful jump.
    pub sparse_medium_window: f64,
    /// No activity in the short window with a large jump.
    pub silent_short_window: f64,
    /// Stale cursor (no movement for a long time) jumping far.
    pub stale_position_jump: f64,
    /// Very large jump regardless of activity.
    pub huge_jump: f64,
    /// Large jump regardless of activity.
    pub large_jump: f64,
    /// Precision landing with no recent approach.
    pub precise_without_approach: f64,
}

impl Default for TrailWeights {
    fn default() -> Self {
        Self {
            silent_long_window: 0.7,
            sparse_medium_window: 0.4,
            silent_short_window: 0.3,
            stale_position_jump: 0.2,
            huge_jump: 0.3,
            large_jump: 0.2,
            precise_without_approach: 0.1,
        }
    }
}

/// Everything the scoring function needs to know about one click.
#[derive(Debug, Clone, Copy)]
pub struct TrailObservation {
    /// Pointer samples in the 1s window before the click.
    pub activity_1s: usize,
    /// Pointer samples in the 3s window before the click.
    pub activity_3s: usize,
    /// Pointer samples in the 5s window before the click.
    pub activity_5s: usize,
    /// Distance from the last known pointer position to the click point.
    pub jump_px: Option<f64>,
    /// Time since the last known pointer movement.
    pub since_last_move_ms: Option<u64>,
}

/// Compose the confidence from the independent weighted factors.
///
/// Returns the clamped sum plus the labels of every factor that
/// contributed, for the audit detail.
pub fn compose_trail_confidence(
    observation: &TrailObservation,
    weights: &TrailWeights,
    expected_min_activity: usize,
) -> (f64, Vec<&'static str>) {
    let mut confidence = 0.0;
    let mut factors = Vec::new();
    let jump = observation.jump_px.unwrap_or(0.0);

    // The three windows are alternatives, strongest first.
    if observation.activity_5s == 0 {
        confidence += weights.silent_long_window;
        factors.push("silent_long_window");
    } else if observation.activity_3s < expected_min_activity && jump > 50.0 {
        confidence += weights.sparse_medium_window;
        factors.push("sparse_medium_window");
    } else if observation.activity_1s == 0 && jump > 100.0 {
        confidence += weights.silent_short_window;
        factors.push("silent_short_window");
    }

    if observation.since_last_move_ms.is_some_and(|ms| ms > 2000) && jump > 100.0 {
        confidence += weights.stale_position_jump;
        factors.push("stale_position_jump");
    }

    if jump > 300.0 {
        confidence += weights.huge_jump;
        factors.push("huge_jump");
    } else if jump > 200.0 {
        confidence += weights.large_jump;
        factors.push("large_jump");
    }

    if observation.activity_1s == 0 && jump > 50.0 {
        confidence += weights.precise_without_approach;
        factors.push("precise_without_approach");
    }

    (confidence.clamp(0.0, 1.0), factors)
}

/// Missing-trail detector.
pub struct MissingTrailDetector {
    config: MissingTrailConfig,
    weights: TrailWeights,
}

impl MissingTrailDetector {
    pub fn new(config: MissingTrailConfig) -> Self {
        Self {
            config,
            weights: TrailWeights::default(),
        }
    }

    /// Override the weight table (tests and tuning).
    pub fn with_weights(mut self, weights: TrailWeights) -> Self {
        self.weights = weights;
        self
    }

    fn observe(&self, history: &SampleHistory, click_ts: u64, click_x: f64, click_y: f64) -> TrailObservation {
        let count_in = |window_ms: u64| {
            history
                .samples_between(click_ts.saturating_sub(window_ms), click_ts)
                .len()
        };

        let last = history.last_sample_before(click_ts);
        let click_point = PointerSample { x: click_x, y: click_y, timestamp_ms: click_ts };

        TrailObservation {
            activity_1s: count_in(WINDOW_SHORT_MS),
            activity_3s: count_in(WINDOW_MEDIUM_MS),
            activity_5s: count_in(WINDOW_LONG_MS),
            jump_px: last.map(|s| s.distance_to(&click_point)),
            since_last_move_ms: last.map(|s| click_ts.saturating_sub(s.timestamp_ms)),
        }
    }
}

impl Detector for MissingTrailDetector {
    fn name(&self) -> &'static str {
        "missing_trail"
    }

    fn indicator(&self) -> &'static str {
        MISSING_MOUSE_TRAILS
    }

    fn trigger(&self) -> Trigger {
        Trigger::Click
    }

    fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
        let Some(click) = history.recent_clicks(1).pop() else {
            return Ok(None);
        };

        // Cold-start gates: nothing fires during warm-up or before enough
        // clicks exist to establish any rhythm at all.
        let Some(started) = history.tracking_started_ms() else {
            return Ok(None);
        };
        if click.timestamp_ms.saturating_sub(started) < self.config.warmup_ms {
            return Ok(None);
        }
        if history.total_clicks() < self.config.min_clicks {
            return Ok(None);
        }

        let observation = self.observe(history, click.timestamp_ms, click.x, click.y);
        let (confidence, factors) = compose_trail_confidence(
            &observation,
            &self.weights,
            self.config.expected_min_activity,
        );

        if confidence < self.config.confidence_threshold {
            return Ok(None);
        }

        let detail = json!({
            "factors": factors,
            "jump_px": observation.jump_px,
            "since_last_move_ms": observation.since_last_move_ms,
            "activity_1s": observation.activity_1s,
            "activity_3s": observation.activity_3s,
            "activity_5s": observation.activity_5s,
        });

        Ok(Some(Detection::new(MISSING_MOUSE_TRAILS, confidence).with_detail(detail)))
    }
}
