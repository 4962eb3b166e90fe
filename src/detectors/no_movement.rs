//! No-movement-before-click detector.
//!
//! A human pointer approaches its target; a scripted one appears on it.
//! The ladder distinguishes three signatures, strongest first: a single
//! synthetic approach move (certain agent-driven browsers dispatch exactly
//! one pointer-move right before the click), no movement at all, and a
//! token few pixels of movement.

use super::{Detection, Detector, Trigger, CLICKS_WITHOUT_MOUSE_MOVEMENT};
use crate::config::NoMovementConfig;
use crate::error::DetectionError;
use crate::events::ClickEvent;
use crate::history::SampleHistory;
use serde_json::json;

/// Labeled outcome of the decision ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Exactly one pointer sample in the window.
    CometSingleMove,
    /// No pointer samples at all in the window.
    NoMovement,
    /// Two or three samples covering a negligible path.
    MinimalMovement,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::CometSingleMove => "comet_single_move",
            Scenario::NoMovement => "no_movement",
            Scenario::MinimalMovement => "minimal_movement",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Scenario::CometSingleMove => 0.95,
            Scenario::NoMovement => 0.90,
            Scenario::MinimalMovement => 0.75,
        }
    }
}

/// No-movement-before-click detector.
pub struct NoMovementDetector {
    config: NoMovementConfig,
    /// Start control exempt from analysis on the first click.
    start_control_id: Option<String>,
}

impl NoMovementDetector {
    pub fn new(config: NoMovementConfig, start_control_id: Option<String>) -> Self {
        Self {
            config,
            start_control_id,
        }
    }

    /// The click that begins tracking is necessarily approach-free; do not
    /// penalize it.
    fn is_exempt_start_click(&self, history: &SampleHistory, click: &ClickEvent) -> bool {
        if history.total_clicks() != 1 {
            return false;
        }
        let Some(start_id) = &self.start_control_id else {
            return false;
        };
        click.element.id.as_deref() == Some(start_id.as_str())
            || click
                .target_selector
                .as_deref()
                .is_some_and(|s| s.contains(start_id.as_str()))
    }

    /// Priority ladder over the pre-click trail, first match wins.
    fn classify(&self, trail_len: usize, path_px: f64) -> Option<Scenario> {
        match trail_len {
            1 => Some(Scenario::CometSingleMove),
            0 => Some(Scenario::NoMovement),
            2 | 3 if path_px <= self.config.minimal_path_px => Some(Scenario::MinimalMovement),
            _ => None,
        }
    }
}

impl Detector for NoMovementDetector {
    fn name(&self) -> &'static str {
        "no_movement"
    }

    fn indicator(&self) -> &'static str {
        CLICKS_WITHOUT_MOUSE_MOVEMENT
    }

    fn trigger(&self) -> Trigger {
        Trigger::Click
    }

    fn threshold(&self) -> f64 {
        Scenario::MinimalMovement.confidence()
    }

    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
        let Some(click) = history.recent_clicks(1).pop() else {
            return Ok(None);
        };

        if self.is_exempt_start_click(history, click) {
            return Ok(None);
        }

        let window_start = click.timestamp_ms.saturating_sub(self.config.time_threshold_ms);
        let trail = history.samples_between(window_start, click.timestamp_ms);

        let path_px: f64 = trail
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();

        let Some(scenario) = self.classify(trail.len(), path_px) else {
            return Ok(None);
        };

        let detail = json!({
            "scenario": scenario.as_str(),
            "trail_length": trail.len(),
            "path_px": path_px,
            "window_ms": self.config.time_threshold_ms,
        });

        Ok(Some(
            Detection::new(CLICKS_WITHOUT_MOUSE_MOVEMENT, scenario.confidence())
                .with_detail(detail),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ElementInfo, PointerSample};

    fn detector() -> NoMovementDetector {
        NoMovementDetector::new(NoMovementConfig::default(), Some("start-tracking".to_string()))
    }

    fn click_at(ts: u64, id: Option<&str>) -> ClickEvent {
        ClickEvent {
            timestamp_ms: ts,
            x: 500.0,
            y: 300.0,
            target_selector: id.map(|i| format!("button#{i}")),
            element: ElementInfo {
                tag: Some("button".to_string()),
                id: id.map(str::to_string),
                ..Default::default()
            },
            bounds: None,
            position_in_element: None,
            trusted: true,
            trail: vec![],
        }
    }

    fn sample(x: f64, y: f64, ts: u64) -> PointerSample {
        PointerSample { x, y, timestamp_ms: ts }
    }

    #[test]
    fn test_single_move_signature() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_pointer(sample(500.0, 300.0, 4900));
        history.record_click(click_at(5000, Some("buy")));

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["scenario"], "comet_single_move");
        assert!((detection.confidence - 0.95).abs() < f64::EPSILON);
        assert_eq!(detection.detail["trail_length"], 1);
    }

    #[test]
    fn test_zero_movement_signature() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_click(click_at(5000, Some("buy")));

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["scenario"], "no_movement");
        assert!((detection.confidence - 0.90).abs() < f64::EPSILON);
    }

    #[test]
    fn test_minimal_movement_signature() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_pointer(sample(500.0, 300.0, 4800));
        history.record_pointer(sample(501.0, 300.0, 4850));
        history.record_pointer(sample(502.0, 300.0, 4900));
        history.record_click(click_at(5000, Some("buy")));

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["scenario"], "minimal_movement");
        assert!((detection.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gradual_approach_is_clean() {
        let d = detector();
        let mut history = SampleHistory::new();
        for i in 0..20u64 {
            history.record_pointer(sample(100.0 + i as f64 * 20.0, 300.0, 4000 + i * 50));
        }
        history.record_click(click_at(5000, Some("buy")));

        assert!(d.evaluate(&history).unwrap().is_none());
    }

    #[test]
    fn test_three_samples_with_real_path_is_clean() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_pointer(sample(100.0, 100.0, 4800));
        history.record_pointer(sample(300.0, 200.0, 4900));
        history.record_pointer(sample(500.0, 300.0, 4950));
        history.record_click(click_at(5000, Some("buy")));

        assert!(d.evaluate(&history).unwrap().is_none());
    }

    #[test]
    fn test_start_control_first_click_exempt() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_click(click_at(5000, Some("start-tracking")));

        assert!(d.evaluate(&history).unwrap().is_none());
    }

    #[test]
    fn test_start_control_second_click_not_exempt() {
        let d = detector();
        let mut history = SampleHistory::new();
        history.record_click(click_at(4000, Some("start-tracking")));
        history.record_click(click_at(8000, Some("start-tracking")));

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["scenario"], "no_movement");
    }

    #[test]
    fn test_only_samples_inside_window_count() {
        let d = detector();
        let mut history = SampleHistory::new();
        // Plenty of movement, but all of it older than the 1s window.
        for i in 0..10u64 {
            history.record_pointer(sample(i as f64 * 50.0, 100.0, 1000 + i * 100));
        }
        history.record_click(click_at(5000, Some("buy")));

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["scenario"], "no_movement");
    }
}
