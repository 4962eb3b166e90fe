//! Bounded rolling histories of interaction samples.
//!
//! One instance per collection session. Every buffer is a fixed-capacity
//! ring with FIFO eviction; telemetry counters are monotonic and survive
//! eviction so totals stay accurate over long sessions.

use crate::events::{ClickEvent, PointerMovement, PointerSample, ScrollSample};
use std::collections::VecDeque;

/// Pointer sample ring capacity.
pub const POINTER_CAPACITY: usize = 100;
/// Derived movement ring capacity.
pub const MOVEMENT_CAPACITY: usize = 50;
/// Click ring capacity.
pub const CLICK_CAPACITY: usize = 50;
/// Scroll ring capacity.
pub const SCROLL_CAPACITY: usize = 100;
/// Click-timing ring capacity (inter-click interval analysis only).
pub const TIMING_CAPACITY: usize = 20;

/// Monotonic counters computed at record time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityCounters {
    pub total_pointer_moves: u64,
    pub total_clicks: u64,
    pub untrusted_clicks: u64,
    pub total_scrolls: u64,
    /// Cumulative pointer path length, px.
    pub total_distance: f64,
    /// Sum of derived velocities, px/s (for the running average).
    pub velocity_sum: f64,
    pub velocity_samples: u64,
    pub max_velocity: f64,
}

/// Per-session sample history store.
#[derive(Debug)]
pub struct SampleHistory {
    pointer_samples: VecDeque<PointerSample>,
    movements: VecDeque<PointerMovement>,
    clicks: VecDeque<ClickEvent>,
    scrolls: VecDeque<ScrollSample>,
    click_timings: VecDeque<u64>,
    counters: ActivityCounters,
    /// Timestamp of the first event recorded this session.
    tracking_started_ms: Option<u64>,
    /// Timestamp of the most recent event recorded this session.
    last_event_ms: Option<u64>,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self {
            pointer_samples: VecDeque::with_capacity(POINTER_CAPACITY),
            movements: VecDeque::with_capacity(MOVEMENT_CAPACITY),
            clicks: VecDeque::with_capacity(CLICK_CAPACITY),
            scrolls: VecDeque::with_capacity(SCROLL_CAPACITY),
            click_timings: VecDeque::with_capacity(TIMING_CAPACITY),
            counters: ActivityCounters::default(),
            tracking_started_ms: None,
            last_event_ms: None,
        }
    }

    fn push_bounded<T>(buf: &mut VecDeque<T>, capacity: usize, value: T) {
        if buf.len() >= capacity {
            buf.pop_front();
        }
        buf.push_back(value);
    }

    fn note_event(&mut self, timestamp_ms: u64) {
        if self.tracking_started_ms.is_none() {
            self.tracking_started_ms = Some(timestamp_ms);
        }
        self.last_event_ms = Some(timestamp_ms);
    }

    /// Record a pointer-move sample and its derived movement.
    pub fn record_pointer(&mut self, sample: PointerSample) {
        self.note_event(sample.timestamp_ms);

        if let Some(prev) = self.pointer_samples.back().copied() {
            let movement = PointerMovement::between(&prev, &sample);
            self.counters.total_distance += movement.distance;
            self.counters.velocity_sum += movement.velocity;
            self.counters.velocity_samples += 1;
            if movement.velocity > self.counters.max_velocity {
                self.counters.max_velocity = movement.velocity;
            }
            Self::push_bounded(&mut self.movements, MOVEMENT_CAPACITY, movement);
        }

        self.counters.total_pointer_moves += 1;
        Self::push_bounded(&mut self.pointer_samples, POINTER_CAPACITY, sample);
    }

    /// Record a click and its timing sample.
    pub fn record_click(&mut self, click: ClickEvent) {
        self.note_event(click.timestamp_ms);
        self.counters.total_clicks += 1;
        if !click.trusted {
            self.counters.untrusted_clicks += 1;
        }
        Self::push_bounded(&mut self.click_timings, TIMING_CAPACITY, click.timestamp_ms);
        Self::push_bounded(&mut self.clicks, CLICK_CAPACITY, click);
    }

    /// Record a wheel scroll sample.
    pub fn record_scroll(&mut self, scroll: ScrollSample) {
        self.note_event(scroll.timestamp_ms);
        self.counters.total_scrolls += 1;
        Self::push_bounded(&mut self.scrolls, SCROLL_CAPACITY, scroll);
    }

    /// Pointer samples with timestamps in `[from_ms, to_ms)`.
    pub fn samples_between(&self, from_ms: u64, to_ms: u64) -> Vec<PointerSample> {
        self.pointer_samples
            .iter()
            .filter(|s| s.timestamp_ms >= from_ms && s.timestamp_ms < to_ms)
            .copied()
            .collect()
    }

    /// Most recent pointer sample strictly before `before_ms`.
    pub fn last_sample_before(&self, before_ms: u64) -> Option<PointerSample> {
        self.pointer_samples
            .iter()
            .rev()
            .find(|s| s.timestamp_ms < before_ms)
            .copied()
    }

    /// The `n` most recent clicks, oldest first.
    pub fn recent_clicks(&self, n: usize) -> Vec<&ClickEvent> {
        let start = self.clicks.len().saturating_sub(n);
        self.clicks.iter().skip(start).collect()
    }

    /// The `n` most recent scroll samples, oldest first.
    pub fn recent_scrolls(&self, n: usize) -> Vec<ScrollSample> {
        let start = self.scrolls.len().saturating_sub(n);
        self.scrolls.iter().skip(start).copied().collect()
    }

    /// Click timestamps in the timing ring, oldest first.
    pub fn click_timings(&self) -> Vec<u64> {
        self.click_timings.iter().copied().collect()
    }

    pub fn pointer_sample_count(&self) -> usize {
        self.pointer_samples.len()
    }

    pub fn movement_count(&self) -> usize {
        self.movements.len()
    }

    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.len()
    }

    pub fn timing_count(&self) -> usize {
        self.click_timings.len()
    }

    /// Total clicks recorded this session, eviction-proof.
    pub fn total_clicks(&self) -> u64 {
        self.counters.total_clicks
    }

    pub fn counters(&self) -> &ActivityCounters {
        &self.counters
    }

    pub fn tracking_started_ms(&self) -> Option<u64> {
        self.tracking_started_ms
    }

    pub fn last_event_ms(&self) -> Option<u64> {
        self.last_event_ms
    }

    /// Observed event span in ms (0 until two events have been seen).
    pub fn observed_span_ms(&self) -> u64 {
        match (self.tracking_started_ms, self.last_event_ms) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    /// Clear every buffer and counter.
    pub fn reset(&mut self) {
        self.pointer_samples.clear();
        self.movements.clear();
        self.clicks.clear();
        self.scrolls.clear();
        self.click_timings.clear();
        self.counters = ActivityCounters::default();
        self.tracking_started_ms = None;
        self.last_event_ms = None;
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, ts: u64) -> PointerSample {
        PointerSample { x, y: 0.0, timestamp_ms: ts }
    }

    fn click(ts: u64) -> ClickEvent {
        ClickEvent {
            timestamp_ms: ts,
            x: 0.0,
            y: 0.0,
            target_selector: None,
            element: Default::default(),
            bounds: None,
            position_in_element: None,
            trusted: true,
            trail: vec![],
        }
    }

    #[test]
    fn test_pointer_ring_eviction() {
        let mut history = SampleHistory::new();
        for i in 0..(POINTER_CAPACITY as u64 + 500) {
            history.record_pointer(sample(i as f64, i));
        }

        assert_eq!(history.pointer_sample_count(), POINTER_CAPACITY);
        assert_eq!(history.movement_count(), MOVEMENT_CAPACITY);
        // Oldest evicted first: the front of the ring is the oldest survivor.
        let survivors = history.samples_between(0, u64::MAX);
        assert_eq!(survivors.first().unwrap().timestamp_ms, 500);
    }

    #[test]
    fn test_counters_survive_eviction() {
        let mut history = SampleHistory::new();
        for i in 0..1000u64 {
            history.record_pointer(sample(i as f64, i * 10));
        }

        assert_eq!(history.counters().total_pointer_moves, 1000);
        // 999 unit movements, each 1px.
        assert!((history.counters().total_distance - 999.0).abs() < 1e-9);
    }

    #[test]
    fn test_timing_ring_capacity() {
        let mut history = SampleHistory::new();
        for i in 0..100u64 {
            history.record_click(click(i * 100));
        }

        assert_eq!(history.timing_count(), TIMING_CAPACITY);
        assert_eq!(history.click_count(), CLICK_CAPACITY);
        assert_eq!(history.total_clicks(), 100);
        // Timing ring holds the most recent timestamps.
        assert_eq!(history.click_timings()[0], (100 - TIMING_CAPACITY as u64) * 100);
    }

    #[test]
    fn test_windowed_queries() {
        let mut history = SampleHistory::new();
        for ts in [100u64, 200, 300, 400] {
            history.record_pointer(sample(ts as f64, ts));
        }

        assert_eq!(history.samples_between(150, 350).len(), 2);
        assert_eq!(history.last_sample_before(250).unwrap().timestamp_ms, 200);
        assert!(history.last_sample_before(100).is_none());
    }

    #[test]
    fn test_untrusted_click_counter() {
        let mut history = SampleHistory::new();
        let mut c = click(10);
        c.trusted = false;
        history.record_click(c);
        history.record_click(click(20));

        assert_eq!(history.counters().untrusted_clicks, 1);
        assert_eq!(history.counters().total_clicks, 2);
    }

    #[test]
    fn test_reset_returns_empty_state() {
        let mut history = SampleHistory::new();
        history.record_pointer(sample(1.0, 1));
        history.record_click(click(2));
        history.record_scroll(ScrollSample { timestamp_ms: 3, delta_x: 0.0, delta_y: 100.0, scroll_top: 0.0 });

        history.reset();

        assert_eq!(history.pointer_sample_count(), 0);
        assert_eq!(history.click_count(), 0);
        assert_eq!(history.scroll_count(), 0);
        assert_eq!(history.timing_count(), 0);
        assert_eq!(*history.counters(), ActivityCounters::default());
        assert_eq!(history.tracking_started_ms(), None);
        assert_eq!(history.observed_span_ms(), 0);
    }

    #[test]
    fn test_tracking_window() {
        let mut history = SampleHistory::new();
        history.record_pointer(sample(0.0, 1000));
        history.record_scroll(ScrollSample { timestamp_ms: 4000, delta_x: 0.0, delta_y: 1.0, scroll_top: 0.0 });

        assert_eq!(history.tracking_started_ms(), Some(1000));
        assert_eq!(history.observed_span_ms(), 3000);
    }
}
