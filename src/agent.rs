//! Main interaction-analysis agent implementation.

use crate::config::InteractionAnalysisConfig;
use crate::detectors::build_registry;
use crate::events::InteractionEvent;
use crate::indicators::{DetectionSummary, IndicatorSnapshot, IndicatorStore};
use crate::session::CollectionSession;
use crate::telemetry::{self, TelemetryStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info};

/// Collection progress, emitted once per poll tick for a host countdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollectionProgress {
    pub elapsed_ms: u64,
    pub total_ms: u64,
}

/// Context recorded alongside every report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Timestamp of the first event observed, if any
    pub started_at_ms: Option<u64>,
    /// False when this is a mid-session partial snapshot
    pub completed: bool,
    /// True when the engine failed to construct and saw nothing
    pub degraded: bool,
    /// The construction error, when degraded
    pub error: Option<String>,
}

/// The single externally meaningful result object.
///
/// Always well-formed: a degraded engine produces the documented default
/// rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub indicators: BTreeMap<String, IndicatorSnapshot>,
    pub summary: DetectionSummary,
    pub telemetry: TelemetryStats,
    pub collection_duration_ms: u64,
    pub metadata: ReportMetadata,
}

impl CollectionReport {
    /// The documented default for a degraded engine.
    fn degraded(error: &str) -> Self {
        Self {
            indicators: BTreeMap::new(),
            summary: DetectionSummary::unknown(),
            telemetry: TelemetryStats::default(),
            collection_duration_ms: 0,
            metadata: ReportMetadata {
                started_at_ms: None,
                completed: false,
                degraded: true,
                error: Some(error.to_string()),
            },
        }
    }
}

type ProgressCallback = Box<dyn Fn(CollectionProgress) + Send + Sync>;

/// Interaction-analysis agent: the host-facing surface.
///
/// Construction never fails; a broken configuration is captured once and
/// every subsequent call degrades to the documented default result. No
/// method returns an error to the host.
pub struct InteractionAnalysisAgent {
    config: InteractionAnalysisConfig,
    session: Mutex<CollectionSession>,
    store: Arc<IndicatorStore>,
    init_error: Option<String>,
    progress: Option<ProgressCallback>,
}

impl InteractionAnalysisAgent {
    /// Create a new agent from configuration.
    pub fn new(config: InteractionAnalysisConfig) -> Self {
        let (registry, init_error) = match build_registry(&config) {
            Ok(registry) => (registry, None),
            Err(e) => {
                error!(error = %e, "engine construction failed; running degraded");
                (Vec::new(), Some(e.to_string()))
            }
        };

        let thresholds: BTreeMap<String, f64> = registry
            .iter()
            .map(|d| (d.indicator().to_string(), d.threshold()))
            .collect();
        let store = Arc::new(IndicatorStore::new(thresholds, config.indicator.max_details));

        let session = CollectionSession::new(registry, config.debug_detail);
        Self {
            config,
            session: Mutex::new(session),
            store,
            init_error,
            progress: None,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(InteractionAnalysisConfig::default())
    }

    /// Register a progress callback, invoked once per poll tick.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// A poisoned lock would mean a panic somewhere inside the engine;
    /// fail open and keep serving rather than propagate.
    fn lock_session(&self) -> MutexGuard<'_, CollectionSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Feed one interaction event from the host bridge.
    ///
    /// Ignored while no session is collecting or when the engine is
    /// degraded.
    pub fn record_event(&self, event: InteractionEvent) {
        if self.init_error.is_some() {
            return;
        }
        self.lock_session().on_event(event, self.store.as_ref());
    }

    /// Run a duration-bounded collection session.
    ///
    /// Never errors. Called while a session is already collecting, it
    /// returns the current partial snapshot instead of starting a second
    /// one.
    pub async fn collect_behavioral_data(&self, duration_ms: Option<u64>) -> CollectionReport {
        if let Some(e) = &self.init_error {
            return CollectionReport::degraded(e);
        }

        let duration_ms = duration_ms.unwrap_or(self.config.session.default_duration_ms);

        {
            let mut session = self.lock_session();
            if !session.start() {
                info!("collection already in progress; returning partial snapshot");
                return self.assemble(&session, false);
            }
            // Indicators from the previous session must not leak in.
            self.store.clear_all();
        }

        info!(duration_ms, "behavioral collection started");

        let started = tokio::time::Instant::now();
        let poll = Duration::from_millis(self.config.session.poll_interval_ms.max(1));
        loop {
            let elapsed = started.elapsed().as_millis() as u64;
            if elapsed >= duration_ms {
                break;
            }
            // stop() flips the session to idle; honor it within one tick.
            if !self.lock_session().is_collecting() {
                break;
            }
            if let Some(callback) = &self.progress {
                callback(CollectionProgress {
                    elapsed_ms: elapsed,
                    total_ms: duration_ms,
                });
            }
            tokio::time::sleep(poll).await;
        }

        let mut session = self.lock_session();
        session.stop();
        let report = self.assemble(&session, true);

        info!(
            detected = report.summary.detected_count,
            risk = report.summary.risk_level.as_str(),
            total_events = report.summary.total_events,
            "behavioral collection complete"
        );

        report
    }

    /// Analyze a previously captured event stream.
    ///
    /// Records every event through the normal intake path, then assembles
    /// the report immediately; the collection duration is the event span.
    pub fn replay(&self, events: impl IntoIterator<Item = InteractionEvent>) -> CollectionReport {
        if let Some(e) = &self.init_error {
            return CollectionReport::degraded(e);
        }

        let mut session = self.lock_session();
        if !session.start() {
            return self.assemble(&session, false);
        }
        self.store.clear_all();

        for event in events {
            session.on_event(event, self.store.as_ref());
        }

        session.stop();
        self.assemble(&session, true)
    }

    /// Current mid-session (or post-session) state without stopping.
    pub fn partial_snapshot(&self) -> CollectionReport {
        if let Some(e) = &self.init_error {
            return CollectionReport::degraded(e);
        }
        let session = self.lock_session();
        self.assemble(&session, false)
    }

    /// Descriptive statistics for the current history contents.
    pub fn get_telemetry_stats(&self) -> TelemetryStats {
        if self.init_error.is_some() {
            return TelemetryStats::default();
        }
        telemetry::compute(self.lock_session().history())
    }

    /// Stop the running session, if any. Takes effect within one poll tick.
    pub fn stop(&self) {
        if self.init_error.is_some() {
            return;
        }
        self.lock_session().stop();
    }

    /// Clear all session state and indicators.
    pub fn reset(&self) {
        if self.init_error.is_some() {
            return;
        }
        self.lock_session().reset();
        self.store.clear_all();
    }

    fn assemble(&self, session: &CollectionSession, completed: bool) -> CollectionReport {
        let history = session.history();
        CollectionReport {
            indicators: self.store.behavioral_indicators(),
            summary: self.store.detection_summary(),
            telemetry: telemetry::compute(history),
            collection_duration_ms: history.observed_span_ms(),
            metadata: ReportMetadata {
                started_at_ms: history.tracking_started_ms(),
                completed,
                degraded: false,
                error: None,
            },
        }
    }
}
