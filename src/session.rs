//! Collection session controller.
//!
//! Owns the per-session history and the ordered detector registry, and
//! dispatches incoming events to both. All mutation happens behind the
//! agent's lock, so buffer writes and detector reads never interleave.
//!
//! The failure contract of the whole subsystem is enforced here: a
//! detector or sink error is logged and degrades to "no detection this
//! event", never aborting intake or the other detectors.

use crate::detectors::{Detector, Trigger};
use crate::events::{ClickEvent, InteractionEvent, PointerSample, ScrollSample};
use crate::history::SampleHistory;
use crate::indicators::{IndicatorSink, IndicatorUpdate};
use tracing::{debug, warn};

/// Collection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Collecting,
}

/// Per-session controller: history + detector registry + dispatch.
pub struct CollectionSession {
    state: SessionState,
    history: SampleHistory,
    registry: Vec<Box<dyn Detector>>,
    /// Stamp each detail payload with the producing detector and its
    /// threshold.
    debug_detail: bool,
}

impl CollectionSession {
    pub fn new(registry: Vec<Box<dyn Detector>>, debug_detail: bool) -> Self {
        Self {
            state: SessionState::Idle,
            history: SampleHistory::new(),
            registry,
            debug_detail,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == SessionState::Collecting
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// Begin a session. Returns false (and changes nothing) if one is
    /// already running; otherwise clears the previous session's buffers.
    pub fn start(&mut self) -> bool {
        if self.is_collecting() {
            return false;
        }
        self.history.reset();
        self.state = SessionState::Collecting;
        true
    }

    /// End the session. Intake stops at the next event.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Clear all buffers outside a session.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.history.reset();
    }

    /// Feed one event. Ignored while idle.
    pub fn on_event(&mut self, event: InteractionEvent, sink: &dyn IndicatorSink) {
        if !self.is_collecting() {
            return;
        }
        match event {
            InteractionEvent::PointerMove(sample) => self.on_pointer_move(sample),
            InteractionEvent::Click(click) => self.on_click(click, sink),
            InteractionEvent::Scroll(scroll) => self.on_scroll(scroll, sink),
        }
    }

    /// Pointer moves only feed the history; no detector runs on them.
    /// They arrive at input-device rate and must stay O(1).
    fn on_pointer_move(&mut self, sample: PointerSample) {
        self.history.record_pointer(sample);
    }

    fn on_click(&mut self, click: ClickEvent, sink: &dyn IndicatorSink) {
        let timestamp_ms = click.timestamp_ms;
        self.history.record_click(click);
        self.dispatch(Trigger::Click, timestamp_ms, sink);
    }

    fn on_scroll(&mut self, scroll: ScrollSample, sink: &dyn IndicatorSink) {
        let timestamp_ms = scroll.timestamp_ms;
        self.history.record_scroll(scroll);
        self.dispatch(Trigger::Scroll, timestamp_ms, sink);
    }

    /// Run every registered detector for the trigger, in declared order.
    fn dispatch(&self, trigger: Trigger, timestamp_ms: u64, sink: &dyn IndicatorSink) {
        for detector in self.registry.iter().filter(|d| d.trigger() == trigger) {
            match detector.evaluate(&self.history) {
                Ok(Some(detection)) => {
                    debug!(
                        detector = detector.name(),
                        indicator = detection.indicator,
                        confidence = detection.confidence,
                        "pattern detected"
                    );
                    let mut detail = detection.detail;
                    if self.debug_detail {
                        if let Some(map) = detail.as_object_mut() {
                            map.insert("detector".to_string(), detector.name().into());
                            map.insert("threshold".to_string(), detector.threshold().into());
                        }
                    }
                    let update = IndicatorUpdate {
                        increment: true,
                        confidence: detection.confidence,
                        detail,
                        timestamp_ms,
                    };
                    if let Err(error) = sink.update_indicator(detection.indicator, update) {
                        warn!(
                            detector = detector.name(),
                            error = %error,
                            "indicator store rejected update; dropping"
                        );
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        detector = detector.name(),
                        error = %error,
                        "detector failed; treating as no detection"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InteractionAnalysisConfig;
    use crate::detectors::{build_registry, Detection, ARTIFICIAL_TIMING};
    use crate::error::DetectionError;
    use crate::history::SampleHistory;
    use crate::indicators::IndicatorStore;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn session() -> CollectionSession {
        CollectionSession::new(
            build_registry(&InteractionAnalysisConfig::default()).unwrap(),
            false,
        )
    }

    fn store() -> IndicatorStore {
        IndicatorStore::new(BTreeMap::new(), 10)
    }

    fn pointer(ts: u64) -> InteractionEvent {
        InteractionEvent::PointerMove(PointerSample { x: 0.0, y: 0.0, timestamp_ms: ts })
    }

    fn click(ts: u64) -> InteractionEvent {
        InteractionEvent::Click(ClickEvent {
            timestamp_ms: ts,
            x: 0.0,
            y: 0.0,
            target_selector: None,
            element: Default::default(),
            bounds: None,
            position_in_element: None,
            trusted: true,
            trail: vec![],
        })
    }

    #[test]
    fn test_start_is_noop_while_collecting() {
        let mut s = session();
        assert!(s.start());
        assert!(!s.start(), "Second start must be rejected");
        assert!(s.is_collecting());
    }

    #[test]
    fn test_events_ignored_while_idle() {
        let mut s = session();
        let sink = store();
        s.on_event(pointer(100), &sink);

        assert_eq!(s.history().pointer_sample_count(), 0);
    }

    #[test]
    fn test_start_clears_previous_session() {
        let mut s = session();
        let sink = store();
        s.start();
        s.on_event(pointer(100), &sink);
        s.stop();

        s.start();
        assert_eq!(s.history().pointer_sample_count(), 0);
    }

    #[test]
    fn test_intake_stops_after_stop() {
        let mut s = session();
        let sink = store();
        s.start();
        s.on_event(pointer(100), &sink);
        s.stop();
        s.on_event(pointer(200), &sink);

        assert_eq!(s.history().pointer_sample_count(), 1);
    }

    /// A detector that always fails, to prove dispatch survives it.
    struct FailingDetector;

    impl Detector for FailingDetector {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn indicator(&self) -> &'static str {
            ARTIFICIAL_TIMING
        }
        fn trigger(&self) -> Trigger {
            Trigger::Click
        }
        fn threshold(&self) -> f64 {
            0.5
        }
        fn evaluate(&self, _: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
            Err(DetectionError::History {
                detector: "failing",
                reason: "synthetic".to_string(),
            })
        }
    }

    /// A detector that always fires.
    struct FiringDetector(AtomicU64);

    impl Detector for FiringDetector {
        fn name(&self) -> &'static str {
            "firing"
        }
        fn indicator(&self) -> &'static str {
            ARTIFICIAL_TIMING
        }
        fn trigger(&self) -> Trigger {
            Trigger::Click
        }
        fn threshold(&self) -> f64 {
            0.5
        }
        fn evaluate(&self, _: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(Some(Detection::new(ARTIFICIAL_TIMING, 0.9)))
        }
    }

    #[test]
    fn test_detector_failure_does_not_abort_later_detectors() {
        let registry: Vec<Box<dyn Detector>> = vec![
            Box::new(FailingDetector),
            Box::new(FiringDetector(AtomicU64::new(0))),
        ];
        let mut s = CollectionSession::new(registry, false);
        let sink = store();
        s.start();

        s.on_event(click(100), &sink);

        // The failing detector was skipped; the firing one still ran and
        // its update landed in the store.
        let indicators = sink.behavioral_indicators();
        assert_eq!(indicators[ARTIFICIAL_TIMING].count, 1);
    }

    #[test]
    fn test_debug_detail_stamps_payloads() {
        let registry: Vec<Box<dyn Detector>> =
            vec![Box::new(FiringDetector(AtomicU64::new(0)))];
        let mut s = CollectionSession::new(registry, true);
        let sink = store();
        s.start();

        s.on_event(click(100), &sink);

        let indicators = sink.behavioral_indicators();
        let detail = &indicators[ARTIFICIAL_TIMING].details[0];
        assert_eq!(detail["detector"], "firing");
        assert_eq!(detail["threshold"], 0.5);
    }
}
