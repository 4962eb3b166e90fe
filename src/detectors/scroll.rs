//! Non-human scroll detector.
//!
//! Wheel input from a hand has jitter in both cadence and magnitude.
//! Scripted scrolling tends to tick like a metronome, repeat the same
//! delta, and favor round numbers (synthetic wheel APIs default to
//! multiples of 100).

use super::{Detection, Detector, Trigger, NON_HUMAN_SCROLLING};
use crate::config::ScrollConfig;
use crate::error::DetectionError;
use crate::history::SampleHistory;
use crate::stats;
use serde_json::json;

/// Bonus added to the confidence when round-number deltas are present.
const PERFECT_VALUE_BONUS: f64 = 0.3;

/// Non-human scroll detector.
pub struct NonHumanScrollDetector {
    config: ScrollConfig,
}

impl NonHumanScrollDetector {
    pub fn new(config: ScrollConfig) -> Self {
        Self { config }
    }
}

impl Detector for NonHumanScrollDetector {
    fn name(&self) -> &'static str {
        "non_human_scroll"
    }

    fn indicator(&self) -> &'static str {
        NON_HUMAN_SCROLLING
    }

    fn trigger(&self) -> Trigger {
        Trigger::Scroll
    }

    fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
        if history.scroll_count() < self.config.min_samples {
            return Ok(None);
        }
        let window = history.recent_scrolls(self.config.window);

        let timestamps: Vec<u64> = window.iter().map(|s| s.timestamp_ms).collect();
        let intervals = stats::intervals(&timestamps);
        let velocities: Vec<f64> = window.iter().map(|s| s.velocity()).collect();

        let timing_regularity = stats::regularity(&intervals).unwrap_or(0.0);
        let velocity_regularity = stats::regularity(&velocities).unwrap_or(0.0);

        let perfect_values = window
            .iter()
            .any(|s| s.delta_y != 0.0 && s.delta_y.abs() % 100.0 == 0.0);

        let flagged = timing_regularity > self.config.timing_regularity_threshold
            || velocity_regularity > self.config.velocity_variance_threshold;
        if !flagged {
            return Ok(None);
        }

        let mut confidence = (timing_regularity + velocity_regularity) / 2.0;
        if perfect_values {
            confidence += PERFECT_VALUE_BONUS;
        }
        let confidence = confidence.clamp(0.0, 1.0);

        if confidence < self.config.confidence_threshold {
            return Ok(None);
        }

        let detail = json!({
            "timing_regularity": timing_regularity,
            "velocity_regularity": velocity_regularity,
            "perfect_values": perfect_values,
            "sample_count": window.len(),
        });

        Ok(Some(Detection::new(NON_HUMAN_SCROLLING, confidence).with_detail(detail)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScrollSample;

    fn detector() -> NonHumanScrollDetector {
        NonHumanScrollDetector::new(ScrollConfig::default())
    }

    fn scroll(ts: u64, delta_y: f64) -> ScrollSample {
        ScrollSample {
            timestamp_ms: ts,
            delta_x: 0.0,
            delta_y,
            scroll_top: 0.0,
        }
    }

    #[test]
    fn test_below_min_samples_is_silent() {
        let d = detector();
        let mut history = SampleHistory::new();
        for i in 0..9u64 {
            history.record_scroll(scroll(i * 100, 100.0));
        }
        assert!(d.evaluate(&history).unwrap().is_none());
    }

    #[test]
    fn test_metronomic_round_scrolling_fires() {
        let d = detector();
        let mut history = SampleHistory::new();
        // Perfectly even cadence, constant delta, exact multiple of 100.
        for i in 0..20u64 {
            history.record_scroll(scroll(i * 100, 100.0));
        }

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert!(detection.confidence >= 0.75);
        assert_eq!(detection.detail["perfect_values"], true);
        assert_eq!(detection.detail["sample_count"], 20);
    }

    #[test]
    fn test_alternating_round_deltas_fire() {
        let d = detector();
        let mut history = SampleHistory::new();
        for i in 0..20u64 {
            let dy = if i % 2 == 0 { 100.0 } else { 200.0 };
            history.record_scroll(scroll(i * 120, dy));
        }

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["perfect_values"], true);
        assert!(detection.confidence >= 0.75);
    }

    #[test]
    fn test_human_scrolling_is_clean() {
        let d = detector();
        let mut history = SampleHistory::new();
        // Momentum-style magnitudes (a few px to a few hundred) with
        // jittered cadence: variance dwarfs mean^2 on both axes.
        let deltas = [
            2.0, -5.0, 180.0, 40.0, -8.0, 220.0, 15.0, 3.0, -90.0, 12.0, 250.0, 6.0, -30.0, 140.0,
            4.0, 18.0, -60.0, 9.0, 205.0, 25.0,
        ];
        let gaps = [
            90u64, 210, 145, 320, 75, 180, 260, 110, 340, 95, 155, 280, 120, 230, 85, 310, 140,
            200, 165, 250,
        ];
        let mut ts = 0u64;
        for (dy, gap) in deltas.iter().zip(gaps.iter()) {
            ts += gap;
            history.record_scroll(scroll(ts, *dy));
        }

        assert!(d.evaluate(&history).unwrap().is_none());
    }

    #[test]
    fn test_uniform_velocity_with_jittered_timing_still_flags() {
        let d = detector();
        let mut history = SampleHistory::new();
        // Identical non-round deltas with human-ish jittered timing: the
        // velocity bar is deliberately low and catches exactly this.
        let gaps = [
            90u64, 210, 145, 320, 75, 180, 260, 110, 340, 95, 155, 280, 120, 230, 85, 310, 140,
            200, 165, 250,
        ];
        let mut ts = 0u64;
        for gap in gaps {
            ts += gap;
            history.record_scroll(scroll(ts, 97.0));
        }

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert_eq!(detection.detail["velocity_regularity"], 1.0);
        assert_eq!(detection.detail["perfect_values"], false);
        assert!(detection.confidence >= 0.75);
    }

    #[test]
    fn test_confidence_always_clamped() {
        let d = detector();
        let mut history = SampleHistory::new();
        // Regularity 1.0 on both axes plus the round-number bonus would
        // reach 1.3 unclamped.
        for i in 0..20u64 {
            history.record_scroll(scroll(i * 100, 300.0));
        }

        let detection = d.evaluate(&history).unwrap().expect("should fire");
        assert!(detection.confidence <= 1.0);
        assert_eq!(detection.confidence, 1.0);
    }
}
