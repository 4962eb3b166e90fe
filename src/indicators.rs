//! Indicator store: named, confidence-scored automation signals.
//!
//! Detectors only propose updates; the store owns counts, retained
//! confidence, and the bounded detail history. Hosts read snapshots and a
//! derived summary. The in-process store here satisfies the same contract
//! a page-side aggregation store would.

use crate::error::DetectionError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// A proposed update for one indicator.
#[derive(Debug, Clone)]
pub struct IndicatorUpdate {
    /// Bump the per-name counter
    pub increment: bool,
    /// Confidence of this observation, [0, 1]
    pub confidence: f64,
    /// Structured context for audit
    pub detail: Value,
    /// Timestamp of the triggering event
    pub timestamp_ms: u64,
}

/// Sink side of the indicator store contract.
///
/// Implementations must not panic back into the detector path; a failed
/// update is reported as an `Err`, which the session logs and drops.
pub trait IndicatorSink: Send + Sync {
    fn update_indicator(&self, name: &str, update: IndicatorUpdate) -> Result<(), DetectionError>;
}

#[derive(Debug)]
struct IndicatorState {
    count: u64,
    confidence: f64,
    details: VecDeque<Value>,
    last_updated_ms: u64,
}

/// Read-side snapshot of one indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub count: u64,
    /// Maximum confidence seen for this name
    pub confidence: f64,
    /// Recent detail payloads, most recent first
    pub details: Vec<Value>,
    /// The emit threshold the producing detector applied
    pub threshold: f64,
    pub last_updated_ms: u64,
}

/// Coarse risk classification derived from the indicator set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Nothing fired
    #[default]
    None,
    /// At least one indicator fired
    Low,
    /// A strong indicator fired
    Medium,
    /// Very strong or broad evidence of automation
    High,
    /// The engine was degraded and saw nothing trustworthy
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

/// Summary of the current detection state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub risk_level: RiskLevel,
    /// Distinct indicators that fired
    pub detected_count: usize,
    /// Total indicator updates recorded
    pub total_events: u64,
    pub max_confidence: f64,
    pub summary: String,
}

impl DetectionSummary {
    /// The summary for a degraded engine.
    pub fn unknown() -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            detected_count: 0,
            total_events: 0,
            max_confidence: 0.0,
            summary: "detection unavailable".to_string(),
        }
    }
}

/// In-process indicator store.
pub struct IndicatorStore {
    indicators: DashMap<String, IndicatorState>,
    /// Registered indicator names and their emit thresholds.
    thresholds: BTreeMap<String, f64>,
    total_events: AtomicU64,
    max_details: usize,
}

impl IndicatorStore {
    /// Create a store seeded with the registered indicators.
    pub fn new(thresholds: BTreeMap<String, f64>, max_details: usize) -> Self {
        Self {
            indicators: DashMap::new(),
            thresholds,
            total_events: AtomicU64::new(0),
            max_details,
        }
    }

    /// Snapshot every indicator that has fired.
    pub fn behavioral_indicators(&self) -> BTreeMap<String, IndicatorSnapshot> {
        self.indicators
            .iter()
            .map(|entry| {
                let threshold = self.thresholds.get(entry.key()).copied().unwrap_or(0.0);
                (
                    entry.key().clone(),
                    IndicatorSnapshot {
                        count: entry.count,
                        confidence: entry.confidence,
                        details: entry.details.iter().cloned().collect(),
                        threshold,
                        last_updated_ms: entry.last_updated_ms,
                    },
                )
            })
            .collect()
    }

    /// Derive the summary from the current indicator set.
    pub fn detection_summary(&self) -> DetectionSummary {
        let mut detected_count = 0usize;
        let mut max_confidence = 0.0f64;
        for entry in self.indicators.iter() {
            if entry.count > 0 {
                detected_count += 1;
                if entry.confidence > max_confidence {
                    max_confidence = entry.confidence;
                }
            }
        }

        let risk_level = if detected_count == 0 {
            RiskLevel::None
        } else if max_confidence >= 0.9 || detected_count >= 3 {
            RiskLevel::High
        } else if max_confidence >= 0.75 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let summary = if detected_count == 0 {
            "no automation patterns detected".to_string()
        } else {
            format!(
                "{} automation pattern{} detected (max confidence {:.2})",
                detected_count,
                if detected_count == 1 { "" } else { "s" },
                max_confidence
            )
        };

        DetectionSummary {
            risk_level,
            detected_count,
            total_events: self.total_events.load(Ordering::Relaxed),
            max_confidence,
            summary,
        }
    }

    /// Drop every indicator and reset the event counter.
    pub fn clear_all(&self) {
        self.indicators.clear();
        self.total_events.store(0, Ordering::Relaxed);
    }
}

impl IndicatorSink for IndicatorStore {
    fn update_indicator(&self, name: &str, update: IndicatorUpdate) -> Result<(), DetectionError> {
        if !update.confidence.is_finite() {
            return Err(DetectionError::Sink {
                name: name.to_string(),
                reason: "non-finite confidence".to_string(),
            });
        }
        let confidence = update.confidence.clamp(0.0, 1.0);

        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut entry = self
            .indicators
            .entry(name.to_string())
            .or_insert_with(|| IndicatorState {
                count: 0,
                confidence: 0.0,
                details: VecDeque::with_capacity(self.max_details),
                last_updated_ms: 0,
            });

        if update.increment {
            entry.count += 1;
        }
        if confidence > entry.confidence {
            entry.confidence = confidence;
        }
        // Most recent first, bounded.
        entry.details.push_front(update.detail);
        entry.details.truncate(self.max_details);
        entry.last_updated_ms = update.timestamp_ms;

        Ok(())
    }
}
