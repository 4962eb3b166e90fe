//! Descriptive interaction telemetry.
//!
//! Pure description of what was observed, computed straight from the
//! history counters; no anomaly judgment lives here. Intended for audit
//! and debugging alongside the indicators, not instead of them.

use crate::history::SampleHistory;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over a collection session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub total_pointer_moves: u64,
    pub total_clicks: u64,
    pub untrusted_clicks: u64,
    pub total_scrolls: u64,

    /// Cumulative pointer path length, px
    pub total_distance_px: f64,
    /// Mean derived movement velocity, px/s
    pub avg_velocity: f64,
    /// Peak derived movement velocity, px/s
    pub max_velocity: f64,

    /// Events per second over the observed span
    pub moves_per_second: f64,
    pub clicks_per_second: f64,
    pub scrolls_per_second: f64,

    pub has_pointer_activity: bool,
    pub has_click_activity: bool,
    pub has_scroll_activity: bool,

    /// Span between the first and last observed event, ms
    pub observed_span_ms: u64,
}

/// Compute the telemetry for the current history contents.
pub fn compute(history: &SampleHistory) -> TelemetryStats {
    let counters = history.counters();
    let span_ms = history.observed_span_ms();

    let per_second = |count: u64| {
        if span_ms == 0 {
            0.0
        } else {
            count as f64 / (span_ms as f64 / 1000.0)
        }
    };

    let avg_velocity = if counters.velocity_samples == 0 {
        0.0
    } else {
        counters.velocity_sum / counters.velocity_samples as f64
    };

    TelemetryStats {
        total_pointer_moves: counters.total_pointer_moves,
        total_clicks: counters.total_clicks,
        untrusted_clicks: counters.untrusted_clicks,
        total_scrolls: counters.total_scrolls,
        total_distance_px: counters.total_distance,
        avg_velocity,
        max_velocity: counters.max_velocity,
        moves_per_second: per_second(counters.total_pointer_moves),
        clicks_per_second: per_second(counters.total_clicks),
        scrolls_per_second: per_second(counters.total_scrolls),
        has_pointer_activity: counters.total_pointer_moves > 0,
        has_click_activity: counters.total_clicks > 0,
        has_scroll_activity: counters.total_scrolls > 0,
        observed_span_ms: span_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ClickEvent, PointerSample, ScrollSample};

    fn feed(history: &mut SampleHistory) {
        for i in 0..11u64 {
            history.record_pointer(PointerSample {
                x: i as f64 * 10.0,
                y: 0.0,
                timestamp_ms: i * 100,
            });
        }
        history.record_click(ClickEvent {
            timestamp_ms: 1000,
            x: 100.0,
            y: 0.0,
            target_selector: None,
            element: Default::default(),
            bounds: None,
            position_in_element: None,
            trusted: true,
            trail: vec![],
        });
        history.record_scroll(ScrollSample {
            timestamp_ms: 2000,
            delta_x: 0.0,
            delta_y: 50.0,
            scroll_top: 0.0,
        });
    }

    #[test]
    fn test_totals_and_booleans() {
        let mut history = SampleHistory::new();
        feed(&mut history);
        let stats = compute(&history);

        assert_eq!(stats.total_pointer_moves, 11);
        assert_eq!(stats.total_clicks, 1);
        assert_eq!(stats.total_scrolls, 1);
        assert!(stats.has_pointer_activity);
        assert!(stats.has_click_activity);
        assert!(stats.has_scroll_activity);
        assert_eq!(stats.observed_span_ms, 2000);
    }

    #[test]
    fn test_distance_and_velocity() {
        let mut history = SampleHistory::new();
        feed(&mut history);
        let stats = compute(&history);

        // 10 movements of 10px each over 100ms: 100px/s throughout.
        assert!((stats.total_distance_px - 100.0).abs() < 1e-9);
        assert!((stats.avg_velocity - 100.0).abs() < 1e-9);
        assert!((stats.max_velocity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rates_over_observed_span() {
        let mut history = SampleHistory::new();
        feed(&mut history);
        let stats = compute(&history);

        // 11 moves over 2 seconds.
        assert!((stats.moves_per_second - 5.5).abs() < 1e-9);
        assert!((stats.clicks_per_second - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_zeroed() {
        let history = SampleHistory::new();
        assert_eq!(compute(&history), TelemetryStats::default());
    }

    #[test]
    fn test_idempotent_without_new_events() {
        let mut history = SampleHistory::new();
        feed(&mut history);

        let first = compute(&history);
        let second = compute(&history);
        assert_eq!(first, second);
    }
}
