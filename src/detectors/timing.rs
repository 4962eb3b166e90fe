//! Artificial-timing detector.
//!
//! Inter-click intervals from a human carry tens of milliseconds of jitter
//! even when clicking as steadily as possible. Scripted clicks land either
//! metronomically (high regularity) or with variance below the human floor.

use super::{Detection, Detector, Trigger, ARTIFICIAL_TIMING};
use crate::config::TimingConfig;
use crate::error::DetectionError;
use crate::history::SampleHistory;
use crate::stats;
use serde_json::json;

/// Bonus when the variance floor trips in addition to the regularity bar.
const LOW_VARIANCE_BONUS: f64 = 0.2;

/// Artificial-timing detector.
pub struct ArtificialTimingDetector {
    config: TimingConfig,
}

impl ArtificialTimingDetector {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }
}

impl Detector for ArtificialTimingDetector {
    fn name(&self) -> &'static str {
        "artificial_timing"
    }

    fn indicator(&self) -> &'static str {
        ARTIFICIAL_TIMING
    }

    fn trigger(&self) -> Trigger {
        Trigger::Click
    }

    fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
        let timings = history.click_timings();
        if timings.len() < self.config.min_samples {
            return Ok(None);
        }

        let intervals = stats::intervals(&timings);
        let Some(regularity) = stats::regularity(&intervals) else {
            return Ok(None);
        };
        let variance = stats::variance(&intervals).unwrap_or(0.0);
        let mean_interval = stats::mean(&intervals).unwrap_or(0.0);

        let too_regular = regularity > self.config.regularity_threshold;
        let below_human_floor = variance < self.config.human_variance_min;
        if !too_regular && !below_human_floor {
            return Ok(None);
        }

        let mut confidence = regularity;
        if below_human_floor {
            confidence += LOW_VARIANCE_BONUS;
        }
        let confidence = confidence.clamp(0.0, 1.0);

        if confidence < self.config.confidence_threshold {
            return Ok(None);
        }

        let detail = json!({
            "regularity": regularity,
            "variance_ms2": variance,
            "mean_interval_ms": mean_interval,
            "sample_count": timings.len(),
        });

        Ok(Some(Detection::new(ARTIFICIAL_TIMING, confidence).with_detail(detail)))
    }
}
